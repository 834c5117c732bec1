//! Item validator: content moderation, geometry sanity, answer-format
//! consistency and MC distractor checks. Runs on every generated item before it
//! is returned.

use std::collections::HashSet;

use crate::domain::{Answer, AnswerForm, Item, ItemType, Shape, Template};

/// Terms that must never reach a learner.
pub const BANNED_TERMS: [&str; 4] = ["kill", "weapon", "drugs", "alcohol"];

/// Case-insensitive substring moderation list.
#[derive(Clone, Debug, PartialEq)]
pub struct Moderation {
  banned: Vec<String>,
}

impl Default for Moderation {
  fn default() -> Self {
    Self { banned: BANNED_TERMS.iter().map(|t| t.to_string()).collect() }
  }
}

impl Moderation {
  /// Built-in list plus configured extras.
  pub fn with_extra<I, S>(extra: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut m = Self::default();
    for term in extra {
      let term = term.as_ref().trim().to_lowercase();
      if !term.is_empty() && !m.banned.contains(&term) {
        m.banned.push(term);
      }
    }
    m
  }

  /// First banned term found in `text`.
  pub fn flagged(&self, text: &str) -> Option<&str> {
    let lower = text.to_lowercase();
    self.banned.iter().find(|t| lower.contains(t.as_str())).map(String::as_str)
  }
}

pub fn validate(item: &Item, template: &Template, moderation: &Moderation) -> bool {
  check(item, template, moderation).is_ok()
}

/// Like `validate`, with the first failure reason.
pub fn check(item: &Item, template: &Template, moderation: &Moderation) -> Result<(), String> {
  check_moderation(item, moderation)?;
  check_geometry(item)?;
  check_answer_format(item, template)?;
  if item.kind == ItemType::Mc {
    check_options(item)?;
  }
  Ok(())
}

fn check_moderation(item: &Item, moderation: &Moderation) -> Result<(), String> {
  if item.prompt.trim().is_empty() {
    return Err("empty prompt".into());
  }
  let context = item.stimulus.as_ref().map(|s| s.context.as_str());
  let texts = std::iter::once(item.prompt.as_str())
    .chain(std::iter::once(item.explanation.as_str()))
    .chain(context)
    .chain(item.hints.iter().map(String::as_str))
    .chain(item.options.iter().flat_map(|o| [o.value.as_str(), o.rationale.as_str()]));
  for text in texts {
    if let Some(term) = moderation.flagged(text) {
      return Err(format!("banned term {term:?} in learner-facing text"));
    }
  }
  Ok(())
}

fn check_geometry(item: &Item) -> Result<(), String> {
  let Some(diagram) = item.stimulus.as_ref().and_then(|s| s.diagram.as_ref()) else {
    return Ok(());
  };
  match &diagram.shape {
    Shape::Trapezoid { b1, b2, h, .. } if *b1 <= 0 || *b2 <= 0 || *h <= 0 => {
      Err(format!("trapezoid dimensions must be positive (b1={b1}, b2={b2}, h={h})"))
    }
    Shape::NumberLine { min, max, .. } if min >= max => Err(format!("empty number line {min}..{max}")),
    Shape::CoordinatePlane { x_min, x_max, y_min, y_max, .. } if x_min >= x_max || y_min >= y_max => {
      Err(format!("empty coordinate plane x {x_min}..{x_max}, y {y_min}..{y_max}"))
    }
    _ => Ok(()),
  }
}

fn check_answer_format(item: &Item, template: &Template) -> Result<(), String> {
  let type_ok = match (item.kind, &item.answer) {
    (ItemType::Numeric, Answer::Integer(_) | Answer::Fraction(_)) => true,
    (ItemType::Numeric, Answer::Decimal(x)) => x.is_finite(),
    (ItemType::Mc, Answer::Choices(_)) => true,
    (ItemType::Expression, Answer::Expression(e)) => !e.trim().is_empty(),
    (ItemType::Plot, Answer::Point(p)) => p.x.is_finite() && p.y.is_finite(),
    _ => false,
  };
  if !type_ok {
    return Err(format!("{} item cannot carry answer {:?}", item.kind.as_str(), item.answer));
  }
  if item.kind != ItemType::Numeric {
    return Ok(());
  }
  let form_ok = match template.answer_format.form {
    AnswerForm::Int => matches!(item.answer, Answer::Integer(_)),
    AnswerForm::Fraction => matches!(item.answer, Answer::Fraction(_)),
    AnswerForm::Decimal => matches!(item.answer, Answer::Decimal(_) | Answer::Integer(_)),
  };
  if !form_ok {
    return Err(format!("answer {} does not match form {:?}", item.answer, template.answer_format.form));
  }
  Ok(())
}

fn check_options(item: &Item) -> Result<(), String> {
  let Answer::Choices(correct) = &item.answer else {
    return Err("mc item without choice answer".into());
  };
  let distractors: Vec<String> = item.options.iter().filter(|o| !o.correct).map(|o| o.value.clone()).collect();
  let has_correct = || item.options.iter().any(|o| o.correct);
  let has_distractor = || !distractors.is_empty();
  let flags_agree = || item.options.iter().all(|o| o.correct == correct.contains(&o.value));
  let predicates: [&dyn Fn() -> bool; 3] = [&has_correct, &has_distractor, &flags_agree];
  check_distractors(correct, &distractors, &predicates)
}

/// No distractor equals a correct value, distractors are pairwise distinct and
/// every extra predicate holds.
pub fn check_distractors(
  correct: &[String],
  distractors: &[String],
  predicates: &[&dyn Fn() -> bool],
) -> Result<(), String> {
  let norm = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
  let correct: HashSet<String> = correct.iter().map(|c| norm(c)).collect();
  let mut seen = HashSet::new();
  for d in distractors {
    let key = norm(d);
    if correct.contains(&key) {
      return Err(format!("distractor {d:?} equals a correct answer"));
    }
    if !seen.insert(key) {
      return Err(format!("duplicate distractor {d:?}"));
    }
  }
  if let Some(i) = predicates.iter().position(|p| !p()) {
    return Err(format!("distractor predicate #{i} failed"));
  }
  Ok(())
}
