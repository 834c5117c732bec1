//! Item factory: the generation pipeline.
//!
//! sample → compute → stimulus → decorate → validate. Each stage may fail and
//! short-circuits the call; nothing partial is returned. The factory is
//! immutable after construction and shared across requests behind an `Arc`.

use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::decorator::decorate;
use crate::domain::{Diagram, Item, Safety, Stimulus, Template};
use crate::error::{GenerationError, TemplateError};
use crate::sampler::{rng_for_seed, sample_for_skill};
use crate::skills::SkillRegistry;
use crate::solver::compute;
use crate::svg;
use crate::templates::TemplateStore;
use crate::validator::{self, Moderation};

pub struct ItemFactory {
  store: TemplateStore,
  skills: SkillRegistry,
  moderation: Moderation,
}

impl ItemFactory {
  pub fn new(store: TemplateStore, skills: SkillRegistry, moderation: Moderation) -> Self {
    Self { store, skills, moderation }
  }

  /// Load every template under `dir` with the built-in skills and moderation list.
  pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
    let store = TemplateStore::load_dir(dir)?;
    Ok(Self::new(store, SkillRegistry::builtin(), Moderation::default()))
  }

  pub fn with_moderation(mut self, moderation: Moderation) -> Self {
    self.moderation = moderation;
    self
  }

  pub fn templates(&self) -> &TemplateStore { &self.store }

  pub fn skills(&self) -> &SkillRegistry { &self.skills }

  /// Easiest template for a skill (lowest difficulty, then id).
  pub fn template_for_teks(&self, teks: &str) -> Option<&Template> {
    self.store.for_teks(teks).min_by(|a, b| a.difficulty.cmp(&b.difficulty).then_with(|| a.id.cmp(&b.id)))
  }

  /// Template for a skill closest to the requested difficulty.
  pub fn template_near_difficulty(&self, teks: &str, difficulty: u8) -> Option<&Template> {
    self
      .store
      .for_teks(teks)
      .min_by_key(|t| ((t.difficulty as i16 - difficulty as i16).abs(), t.id.clone()))
  }

  /// Deterministic: the same `(template_id, seed)` always yields the same item.
  #[instrument(level = "debug", skip(self), fields(%template_id, seed))]
  pub fn generate_item(&self, template_id: &str, seed: u64) -> Result<Item, GenerationError> {
    let template = self
      .store
      .get(template_id)
      .ok_or_else(|| GenerationError::TemplateNotFound(template_id.to_string()))?;
    let skill = self.skills.get(&template.teks);
    let mut rng = rng_for_seed(seed);

    let params = sample_for_skill(template, skill, &mut rng)?;
    let (answer, meta) = compute(template, &params)?;
    let diagram = skill.diagram(&params)?.map(|shape| Diagram { svg: svg::render(&shape), shape });
    let decoration = decorate(template, skill, &params, &answer, &meta, &mut rng)?;

    let stimulus = if decoration.context.is_empty() && diagram.is_none() {
      None
    } else {
      Some(Stimulus { context: decoration.context, diagram })
    };

    let mut item = Item {
      id: Item::make_id(&template.teks, &template.id, seed),
      teks: template.teks.clone(),
      kind: template.kind,
      template_id: template.id.clone(),
      seed,
      params,
      stimulus,
      prompt: decoration.prompt,
      options: decoration.options,
      answer_equivalents: answer.equivalents(),
      answer,
      answer_format: template.answer_format,
      hints: decoration.hints,
      explanation: decoration.explanation,
      difficulty: template.difficulty,
      tags: skill.tags().iter().map(|t| t.to_string()).collect(),
      safety: Safety { moderation_passed: false },
    };

    validator::check(&item, template, &self.moderation).map_err(GenerationError::ValidationFailed)?;
    item.safety.moderation_passed = true;
    debug!(target: "item", id = %item.id, kind = item.kind.as_str(), "Generated item");
    Ok(item)
  }

  /// Retry seed-dependent failures with `seed + 1`, `seed + 2`, … up to
  /// `attempts` tries. Other failures return immediately.
  #[instrument(level = "debug", skip(self), fields(%template_id, seed, attempts))]
  pub fn generate_with_retries(&self, template_id: &str, seed: u64, attempts: u32) -> Result<Item, GenerationError> {
    let mut last_err = GenerationError::ValidationFailed("no attempt made".into());
    for n in 0..attempts.max(1) {
      let s = seed.wrapping_add(n as u64);
      match self.generate_item(template_id, s) {
        Ok(item) => return Ok(item),
        Err(e) if e.is_retryable() => {
          warn!(target: "item", %template_id, seed = s, error = %e, "Generation attempt failed; retrying");
          last_err = e;
        }
        Err(e) => return Err(e),
      }
    }
    Err(last_err)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{Answer, ItemType, Shape};
  use crate::templates::parse_template;
  use std::collections::HashSet;

  fn factory() -> ItemFactory {
    ItemFactory::from_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/content/templates")).unwrap()
  }

  #[test]
  fn every_shipped_template_generates() {
    let f = factory();
    let ids: Vec<String> = f.templates().ids().map(str::to_string).collect();
    assert!(ids.len() >= 7);
    for id in ids {
      for seed in 0..25 {
        let item = f.generate_with_retries(&id, seed, 5).unwrap_or_else(|e| panic!("{id}/{seed}: {e}"));
        assert!(item.safety.moderation_passed);
        assert!(!item.prompt.is_empty());
        assert!(!item.hints.is_empty());
        assert!(!item.answer_equivalents.is_empty());
      }
    }
  }

  #[test]
  fn same_seed_same_item() {
    let f = factory();
    for id in ["6.8B_trapezoid_area", "6.4_unit_rate", "6.7B_expr_vs_eq"] {
      let a = f.generate_with_retries(id, 12345, 5).unwrap();
      let b = f.generate_with_retries(id, 12345, 5).unwrap();
      assert_eq!(a, b);
      assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
      assert_eq!(a.id, format!("itm_{}_{}_{}", a.teks, id, a.seed));
    }
  }

  #[test]
  fn trapezoid_items_are_exact_and_drawn() {
    let f = factory();
    for seed in 0..40 {
      let item = f.generate_item("6.8B_trapezoid_area", seed).unwrap();
      let (b1, b2, h) = (item.params.int("b1").unwrap(), item.params.int("b2").unwrap(), item.params.int("h").unwrap());
      assert_eq!(item.answer, Answer::Integer((b1 + b2) * h / 2));
      let diagram = item.stimulus.as_ref().and_then(|s| s.diagram.as_ref()).unwrap();
      assert!(matches!(diagram.shape, Shape::Trapezoid { .. }));
      assert!(diagram.svg.starts_with("<svg"));
    }
  }

  #[test]
  fn mc_distractors_are_unique() {
    let f = factory();
    for seed in 0..40 {
      // a pick of only equations (or only expressions) is rejected and retried
      let item = f.generate_with_retries("6.7B_expr_vs_eq", seed, 5).unwrap();
      assert_eq!(item.kind, ItemType::Mc);
      let values: Vec<&str> = item.options.iter().map(|o| o.value.as_str()).collect();
      let unique: HashSet<&str> = values.iter().copied().collect();
      assert_eq!(unique.len(), values.len());
      let Answer::Choices(correct) = &item.answer else { panic!("mc answer") };
      for o in item.options.iter().filter(|o| !o.correct) {
        assert!(!correct.contains(&o.value));
      }
    }
  }

  #[test]
  fn unknown_template_is_not_found() {
    let err = factory().generate_item("nope", 1).unwrap_err();
    assert_eq!(err, GenerationError::TemplateNotFound("nope".into()));
    assert!(!err.is_retryable());
  }

  #[test]
  fn retries_walk_past_bad_seeds_and_stop_on_fatal_errors() {
    // ÷ with b = 0 fails for every seed; the retry loop gives up with the last error.
    let zero_div = parse_template(
      r#"
id = "div0"
teks = "6.2"
type = "numeric"
compute = "rational_op"
difficulty = 1
[params]
a = 3
b = 0
op = "÷"
"#,
      "toml",
      Path::new("div0.toml"),
    )
    .unwrap();
    let missing = parse_template(
      r#"
id = "missing"
teks = "6.8B"
type = "numeric"
compute = "unit_rate"
difficulty = 1
"#,
      "toml",
      Path::new("missing.toml"),
    )
    .unwrap();
    let store = TemplateStore::from_templates([zero_div, missing]).unwrap();
    let f = ItemFactory::new(store, SkillRegistry::builtin(), Moderation::default());
    assert!(matches!(f.generate_with_retries("div0", 1, 3), Err(GenerationError::DivisionByZero(_))));
    assert_eq!(f.generate_with_retries("missing", 1, 3), Err(GenerationError::MissingParam("x".into())));
  }

  #[test]
  fn moderation_extras_reject_items() {
    let f = factory().with_moderation(Moderation::with_extra(["trapezoid"]));
    let err = f.generate_item("6.8B_trapezoid_area", 3).unwrap_err();
    assert!(matches!(err, GenerationError::ValidationFailed(_)));
  }
}
