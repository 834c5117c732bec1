//! Loading tutor configuration from TOML.
//!
//! Every section and field is optional; missing values fall back to defaults.
//!
//! ```toml
//! [generation]
//! templates_dir = "content/templates"
//! max_attempts = 5
//!
//! [grading]
//! plot_tolerance = 0.25
//!
//! [mastery]
//! alpha = 0.2
//! threshold = 0.83
//! min_items = 15
//!
//! [moderation]
//! extra_banned_terms = ["casino"]
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::grader::DEFAULT_PLOT_TOLERANCE;
use crate::mastery::MasteryParams;

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
pub struct TutorConfig {
  #[serde(default)]
  pub generation: GenerationCfg,
  #[serde(default)]
  pub grading: GradingCfg,
  #[serde(default)]
  pub mastery: MasteryParams,
  #[serde(default)]
  pub moderation: ModerationCfg,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationCfg {
  pub templates_dir: String,
  /// Seeds tried per request before falling back.
  pub max_attempts: u32,
}

impl Default for GenerationCfg {
  fn default() -> Self {
    Self { templates_dir: "content/templates".into(), max_attempts: 5 }
  }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GradingCfg {
  pub plot_tolerance: f64,
}

impl Default for GradingCfg {
  fn default() -> Self {
    Self { plot_tolerance: DEFAULT_PLOT_TOLERANCE }
  }
}

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ModerationCfg {
  pub extra_banned_terms: Vec<String>,
}

/// Attempt to load `TutorConfig` from TUTOR_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_tutor_config_from_env() -> Option<TutorConfig> {
  let path = std::env::var("TUTOR_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<TutorConfig>(&s) {
      Ok(cfg) => {
        info!(target: "teks_tutor", %path, "Loaded tutor config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "teks_tutor", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "teks_tutor", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// File config (or defaults) with TEMPLATES_DIR taking precedence.
pub fn resolve_config() -> TutorConfig {
  let mut cfg = load_tutor_config_from_env().unwrap_or_default();
  if let Ok(dir) = std::env::var("TEMPLATES_DIR") {
    if !dir.trim().is_empty() {
      cfg.generation.templates_dir = dir;
    }
  }
  cfg
}
