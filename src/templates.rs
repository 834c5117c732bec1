//! Template store: loads problem templates from a directory of `*.toml` / `*.json`
//! files once at startup.
//!
//! Every file is validated eagerly (item type, compute rule, parameter domains,
//! difficulty), so a malformed template stops the process at boot instead of
//! failing the first learner who hits it.
//!
//! Expected schema (TOML shown; JSON uses the same keys):
//!
//! ```toml
//! id = "6.8B_trapezoid_area"
//! teks = "6.8B"
//! type = "numeric"            # numeric | mc | expression | plot
//! compute = "trapezoid_area"
//! difficulty = 2              # 1..=5
//!
//! [params]
//! h_min = 3                   # literal
//! units = ["cm", "m"]         # list: one uniform pick
//! a = { min = 1, max = 9 }    # inclusive integer range
//! op = { choices = ["+", "-"] }
//! forms = { choices = ["x = 1", "x + 1"], pick = 2 }
//!
//! [answer_format]
//! form = "int"                # int | decimal | fraction
//! tolerance = 0.01
//!
//! [presentation]
//! ask = "Find the area."
//! ```

use std::{
  collections::{BTreeMap, HashMap},
  path::{Path, PathBuf},
};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::domain::{AnswerFormat, ComputeRule, ItemType, ParamDomain, ParamValue, Presentation, Template};
use crate::error::TemplateError;

#[derive(Debug, Deserialize)]
struct TemplateFile {
  id: String,
  teks: String,
  #[serde(rename = "type")]
  kind: String,
  compute: String,
  #[serde(default)]
  params: BTreeMap<String, Value>,
  #[serde(default)]
  answer_format: AnswerFormat,
  difficulty: u8,
  #[serde(default)]
  presentation: Presentation,
}

/// Parse one template from TOML (`ext == "toml"`) or JSON text.
pub fn parse_template(text: &str, ext: &str, path: &Path) -> Result<Template, TemplateError> {
  let parse_err = |message: String| TemplateError::Parse { path: path.to_path_buf(), message };
  let raw: TemplateFile = match ext {
    "toml" => toml::from_str(text).map_err(|e| parse_err(e.to_string()))?,
    "json" => serde_json::from_str(text).map_err(|e| parse_err(e.to_string()))?,
    other => return Err(parse_err(format!("unsupported extension {other:?}"))),
  };
  raw.into_template()
}

impl TemplateFile {
  fn into_template(self) -> Result<Template, TemplateError> {
    let id = self.id.trim().to_string();
    let schema = |reason: String| TemplateError::Schema { template_id: id.clone(), reason };

    if id.is_empty() {
      return Err(schema("id must not be empty".into()));
    }
    if self.teks.trim().is_empty() {
      return Err(schema("teks must not be empty".into()));
    }
    if !(1..=5).contains(&self.difficulty) {
      return Err(schema(format!("difficulty {} outside 1..=5", self.difficulty)));
    }
    if let Some(tol) = self.answer_format.tolerance {
      if !tol.is_finite() || tol < 0.0 {
        return Err(schema(format!("tolerance {tol} must be a non-negative number")));
      }
    }
    let kind: ItemType = self.kind.parse().map_err(schema)?;
    let compute: ComputeRule = self.compute.parse().map_err(|compute| {
      TemplateError::UnsupportedComputeRule { template_id: id.clone(), compute }
    })?;

    let mut params = BTreeMap::new();
    for (name, value) in &self.params {
      let domain = param_domain(value).map_err(|reason| schema(format!("param {name}: {reason}")))?;
      params.insert(name.clone(), domain);
    }

    Ok(Template {
      id: id.clone(),
      teks: self.teks.trim().to_string(),
      kind,
      compute,
      params,
      answer_format: self.answer_format,
      difficulty: self.difficulty,
      presentation: self.presentation,
    })
  }
}

/// Interpret one raw parameter declaration.
pub fn param_domain(value: &Value) -> Result<ParamDomain, String> {
  match value {
    Value::Object(map) => {
      if let (Some(min), Some(max)) = (map.get("min"), map.get("max")) {
        if map.len() != 2 {
          return Err("a range takes only `min` and `max`".into());
        }
        let min = min.as_i64().ok_or("`min` must be an integer")?;
        let max = max.as_i64().ok_or("`max` must be an integer")?;
        if min > max {
          return Err(format!("empty range: min {min} > max {max}"));
        }
        return Ok(ParamDomain::Range { min, max });
      }
      if let Some(choices) = map.get("choices") {
        let choices = scalar_list(choices)?;
        return match (map.get("pick"), map.len()) {
          (None, 1) => Ok(ParamDomain::Choices(choices)),
          (Some(pick), 2) => {
            let count = pick.as_u64().ok_or("`pick` must be a positive integer")? as usize;
            if count == 0 || count > choices.len() {
              return Err(format!("cannot pick {count} of {} choices", choices.len()));
            }
            let distinct: std::collections::HashSet<String> = choices.iter().map(|c| c.to_string()).collect();
            if distinct.len() != choices.len() {
              return Err("choices must be distinct when picking several".into());
            }
            Ok(ParamDomain::Pick { choices, count })
          }
          _ => Err("`choices` accepts only an optional `pick`".into()),
        };
      }
      let keys: Vec<&String> = map.keys().collect();
      Err(format!("unknown domain shape with keys {keys:?}"))
    }
    Value::Array(_) => Ok(ParamDomain::Choices(scalar_list(value)?)),
    other => scalar(other).map(ParamDomain::Fixed),
  }
}

fn scalar(value: &Value) -> Result<ParamValue, String> {
  match value {
    Value::Number(n) => n
      .as_i64()
      .map(ParamValue::Int)
      .or_else(|| n.as_f64().map(ParamValue::Float))
      .ok_or_else(|| format!("unsupported number {n}")),
    Value::String(s) => Ok(ParamValue::Text(s.clone())),
    other => Err(format!("unsupported value {other}")),
  }
}

fn scalar_list(value: &Value) -> Result<Vec<ParamValue>, String> {
  let items = value.as_array().ok_or("`choices` must be a list")?;
  if items.is_empty() {
    return Err("choice list must not be empty".into());
  }
  items.iter().map(scalar).collect()
}

/// In-memory template cache keyed by template id. Read-only after construction.
#[derive(Clone, Debug, Default)]
pub struct TemplateStore {
  by_id: BTreeMap<String, Template>,
}

impl TemplateStore {
  pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Result<Self, TemplateError> {
    let mut by_id = BTreeMap::new();
    for t in templates {
      if by_id.contains_key(&t.id) {
        return Err(TemplateError::DuplicateTemplate(t.id));
      }
      by_id.insert(t.id.clone(), t);
    }
    Ok(Self { by_id })
  }

  /// Load every `*.toml` / `*.json` file of `dir`, in file-name order.
  #[instrument(level = "info", skip_all, fields(dir = %dir.as_ref().display()))]
  pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
    let dir = dir.as_ref();
    let io_err = |path: &Path, source| TemplateError::Io { path: path.to_path_buf(), source };

    let mut files: Vec<(PathBuf, String)> = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
      let path = entry.map_err(|e| io_err(dir, e))?.path();
      let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
      if let Some(ext @ ("toml" | "json")) = ext.as_deref() {
        files.push((path.clone(), ext.to_string()));
      }
    }
    files.sort();

    let mut templates = Vec::with_capacity(files.len());
    for (path, ext) in &files {
      let text = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
      let t = parse_template(&text, ext, path)?;
      debug!(target: "teks_tutor", id = %t.id, teks = %t.teks, compute = t.compute.as_str(), "Loaded template");
      templates.push(t);
    }
    if templates.is_empty() {
      return Err(TemplateError::EmptyStore(dir.to_path_buf()));
    }

    let store = Self::from_templates(templates)?;
    let mut count_by_teks: HashMap<&str, usize> = HashMap::new();
    for t in store.iter() {
      *count_by_teks.entry(t.teks.as_str()).or_default() += 1;
    }
    for (teks, count) in count_by_teks {
      info!(target: "teks_tutor", %teks, templates = count, "Startup template inventory");
    }
    Ok(store)
  }

  pub fn get(&self, id: &str) -> Option<&Template> { self.by_id.get(id) }

  pub fn iter(&self) -> impl Iterator<Item = &Template> { self.by_id.values() }

  pub fn ids(&self) -> impl Iterator<Item = &str> { self.by_id.keys().map(String::as_str) }

  pub fn len(&self) -> usize { self.by_id.len() }

  pub fn is_empty(&self) -> bool { self.by_id.is_empty() }

  /// Templates practising `teks`, in id order.
  pub fn for_teks<'a, 'b>(&'a self, teks: &'b str) -> impl Iterator<Item = &'a Template> + 'b
  where
    'a: 'b,
  {
    self.by_id.values().filter(move |t| t.teks == teks)
  }
}
