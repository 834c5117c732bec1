//! Content decorator: learner-facing wording around a computed answer.
//!
//! Wording comes from fixed per-skill variants chosen with the call's random
//! stream, so decoration is reproducible from the seed.

use crate::domain::{Answer, McOption, Params, Template};
use crate::error::GenerationError;
use crate::sampler::ItemRng;
use crate::skills::Skill;
use crate::solver::ComputeMeta;

#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
  pub context: String,
  pub prompt: String,
  pub hints: Vec<String>,
  pub explanation: String,
  pub options: Vec<McOption>,
}

/// Option label for position `i`: `A`, `B`, … then `AA`, `AB`, …
pub fn option_label(i: usize) -> String {
  let letter = |n: usize| char::from(b'A' + (n % 26) as u8);
  if i < 26 {
    letter(i).to_string()
  } else {
    format!("{}{}", letter(i / 26 - 1), letter(i))
  }
}

pub fn decorate(
  template: &Template,
  skill: &dyn Skill,
  params: &Params,
  answer: &Answer,
  meta: &ComputeMeta,
  rng: &mut ItemRng,
) -> Result<Decoration, GenerationError> {
  let context = skill.build_context(params, rng);
  let prompt = skill.build_prompt(template, params)?;
  let hints = skill.build_hints(params, rng)?;
  let explanation = skill.build_explanation(params, answer, meta);

  let options = if matches!(answer, Answer::Choices(_)) {
    skill
      .option_values(params)?
      .into_iter()
      .enumerate()
      .map(|(i, value)| {
        let (correct, rationale) = skill.classify_option(&value, answer);
        McOption { label: option_label(i), value, correct, rationale }
      })
      .collect()
  } else {
    Vec::new()
  };

  Ok(Decoration { context, prompt, hints, explanation, options })
}
