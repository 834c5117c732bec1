//! Multi-modal grading: numeric (tolerance or exact rational), expression
//! equivalence, multiple choice and plotted points.
//!
//! Grading never fails. Input that cannot be read is graded incorrect with
//! `PARSE_ERROR`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::{Answer, AnswerForm, Item, ItemType, Point};
use crate::expr;
use crate::fraction::Fraction;

/// Default distance for plotted points.
pub const DEFAULT_PLOT_TOLERANCE: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedbackCode {
  Ok,
  NumMismatch,
  ParseError,
  ExprMismatch,
  McWrong,
  PlotOff,
}

/// The key in the form shown back to the learner.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Canonical {
  Number(f64),
  Text(String),
  Choices(Vec<String>),
  Point(Point),
}

impl Canonical {
  pub fn of(answer: &Answer) -> Self {
    match answer {
      Answer::Integer(n) => Canonical::Number(*n as f64),
      Answer::Decimal(x) => Canonical::Number(*x),
      Answer::Fraction(f) => Canonical::Text(f.to_string()),
      Answer::Choices(values) => Canonical::Choices(values.clone()),
      Answer::Expression(e) => Canonical::Text(e.clone()),
      Answer::Point(p) => Canonical::Point(*p),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GradeResult {
  pub correct: bool,
  pub canonical: Canonical,
  pub feedback_code: FeedbackCode,
}

impl GradeResult {
  fn new(correct: bool, canonical: Canonical, wrong: FeedbackCode) -> Self {
    let feedback_code = if correct { FeedbackCode::Ok } else { wrong };
    Self { correct, canonical, feedback_code }
  }

  fn parse_error(canonical: Canonical) -> Self {
    Self { correct: false, canonical, feedback_code: FeedbackCode::ParseError }
  }
}

/// A multiple-choice selection: one value or a select-all set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum McChoice {
  Single(String),
  Multi(Vec<String>),
}

/// Raw learner response as received over the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submission {
  Number(f64),
  Text(String),
  Choices(Vec<String>),
  Point(Point),
}

/// Numeric grading. Fraction form compares exact rationals; other forms accept
/// `|user - key| <= tolerance`, evaluated exactly on the decimal text when both
/// sides read as rationals.
pub fn grade_numeric(user: &str, key: &str, tolerance: f64, form: AnswerForm) -> GradeResult {
  let key_exact = key.parse::<Fraction>().ok();
  let key_float = key_exact.map(|k| k.to_f64()).or_else(|| key.trim().parse::<f64>().ok());

  if form == AnswerForm::Fraction {
    let canonical = Canonical::Text(key_exact.map(|k| k.to_string()).unwrap_or_else(|| key.to_string()));
    return match (user.parse::<Fraction>(), key_exact) {
      (Ok(u), Some(k)) => GradeResult::new(u == k, canonical, FeedbackCode::NumMismatch),
      _ => GradeResult::parse_error(canonical),
    };
  }

  let Some(key_float) = key_float.filter(|k| k.is_finite()) else {
    return GradeResult::parse_error(Canonical::Text(key.to_string()));
  };
  let canonical = Canonical::Number(key_float);
  let tolerance = if tolerance.is_finite() { tolerance.max(0.0) } else { 0.0 };

  let exact = (|| {
    let u = user.parse::<Fraction>().ok()?;
    let diff = u.checked_sub(key_exact?)?.abs();
    let tol = Fraction::from_f64(tolerance)?;
    Some(diff.checked_cmp(&tol)?.is_le())
  })();
  if let Some(correct) = exact {
    return GradeResult::new(correct, canonical, FeedbackCode::NumMismatch);
  }

  match user.trim().parse::<f64>() {
    Ok(u) if u.is_finite() => GradeResult::new((u - key_float).abs() <= tolerance, canonical, FeedbackCode::NumMismatch),
    _ => GradeResult::parse_error(canonical),
  }
}

/// Symbolic equivalence. Unreadable learner input is a parse error, a readable
/// but different expression is a mismatch.
pub fn grade_expression(user: &str, key: &str) -> GradeResult {
  let canonical = Canonical::Text(key.to_string());
  if expr::parse(user).is_err() {
    return GradeResult::parse_error(canonical);
  }
  GradeResult::new(expr::equivalent(user, key), canonical, FeedbackCode::ExprMismatch)
}

/// Single choices compare exactly; select-all sets ignore order and repeats.
pub fn grade_mc(choice: &McChoice, correct: &McChoice) -> GradeResult {
  let ok = match (choice, correct) {
    (McChoice::Single(a), McChoice::Single(b)) => a.trim() == b.trim(),
    (McChoice::Multi(a), McChoice::Multi(b)) => {
      let set = |v: &[String]| v.iter().map(|s| s.trim().to_string()).collect::<BTreeSet<_>>();
      set(a) == set(b)
    }
    _ => false,
  };
  let canonical = match correct {
    McChoice::Single(s) => Canonical::Text(s.clone()),
    McChoice::Multi(v) => Canonical::Choices(v.clone()),
  };
  GradeResult::new(ok, canonical, FeedbackCode::McWrong)
}

/// Euclidean distance within `tolerance`.
pub fn grade_plot(point: Point, target: Point, tolerance: f64) -> GradeResult {
  let dist = ((point.x - target.x).powi(2) + (point.y - target.y).powi(2)).sqrt();
  GradeResult::new(dist.is_finite() && dist <= tolerance, Canonical::Point(target), FeedbackCode::PlotOff)
}

/// Read `"(x, y)"` or `"x, y"`.
pub fn parse_point(text: &str) -> Option<Point> {
  let inner = text.trim().trim_start_matches('(').trim_end_matches(')');
  let (x, y) = inner.split_once(',')?;
  let coord = |s: &str| {
    let s = s.trim();
    s.parse::<Fraction>().map(|f| f.to_f64()).ok().or_else(|| s.parse::<f64>().ok())
  };
  let (x, y) = (coord(x)?, coord(y)?);
  (x.is_finite() && y.is_finite()).then_some(Point { x, y })
}

/// Grade a learner response against an issued item, dispatching on its type.
#[instrument(level = "debug", skip(item, submission), fields(item_id = %item.id))]
pub fn grade_item(item: &Item, submission: &Submission, plot_tolerance: f64) -> GradeResult {
  let canonical = Canonical::of(&item.answer);
  let result = match item.kind {
    ItemType::Numeric => match submission {
      Submission::Number(x) => grade_numeric(&x.to_string(), &item.answer.key_text(), tolerance_of(item), item.answer_format.form),
      Submission::Text(s) => grade_numeric(s, &item.answer.key_text(), tolerance_of(item), item.answer_format.form),
      _ => GradeResult::parse_error(canonical),
    },
    ItemType::Expression => match submission {
      Submission::Text(s) => grade_expression(s, &item.answer.key_text()),
      Submission::Number(x) => grade_expression(&x.to_string(), &item.answer.key_text()),
      _ => GradeResult::parse_error(canonical),
    },
    ItemType::Mc => {
      let picked: Vec<String> = match submission {
        Submission::Text(s) => vec![option_value(item, s)],
        Submission::Choices(v) => v.iter().map(|s| option_value(item, s)).collect(),
        _ => return GradeResult::parse_error(canonical),
      };
      let correct = match &item.answer {
        Answer::Choices(values) => values.clone(),
        other => vec![other.key_text()],
      };
      grade_mc(&McChoice::Multi(picked), &McChoice::Multi(correct))
    }
    ItemType::Plot => {
      let target = match item.answer {
        Answer::Point(p) => p,
        _ => return GradeResult::parse_error(canonical),
      };
      let tolerance = item.answer_format.tolerance.unwrap_or(plot_tolerance);
      match submission {
        Submission::Point(p) => grade_plot(*p, target, tolerance),
        Submission::Text(s) => match parse_point(s) {
          Some(p) => grade_plot(p, target, tolerance),
          None => GradeResult::parse_error(canonical),
        },
        _ => GradeResult::parse_error(canonical),
      }
    }
  };
  debug!(target: "grading", correct = result.correct, feedback = ?result.feedback_code, "Graded submission");
  result
}

fn tolerance_of(item: &Item) -> f64 {
  item.answer_format.tolerance.unwrap_or(0.0)
}

/// Map an option label (`"B"`) to its value; anything else is taken as a value.
fn option_value(item: &Item, picked: &str) -> String {
  let picked = picked.trim();
  item
    .options
    .iter()
    .find(|o| o.label.eq_ignore_ascii_case(picked))
    .map(|o| o.value.clone())
    .unwrap_or_else(|| picked.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{AnswerFormat, McOption, Params, Safety};
  use proptest::prelude::*;

  fn item(kind: ItemType, answer: Answer, tolerance: Option<f64>) -> Item {
    Item {
      id: "itm".into(),
      teks: "6.x".into(),
      kind,
      template_id: "t".into(),
      seed: 0,
      params: Params::new(),
      stimulus: None,
      prompt: "?".into(),
      options: vec![],
      answer_equivalents: answer.equivalents(),
      answer,
      answer_format: AnswerFormat { form: AnswerForm::Decimal, tolerance },
      hints: vec![],
      explanation: String::new(),
      difficulty: 1,
      tags: vec![],
      safety: Safety { moderation_passed: true },
    }
  }

  #[test]
  fn numeric_exact() {
    let r = grade_numeric("42", "42", 0.0, AnswerForm::Int);
    assert!(r.correct);
    assert_eq!(r.canonical, Canonical::Number(42.0));
    assert_eq!(r.feedback_code, FeedbackCode::Ok);
  }

  #[test]
  fn numeric_with_tolerance() {
    let r = grade_numeric("42.1", "42", 0.2, AnswerForm::Decimal);
    assert!(r.correct);
    assert_eq!(r.canonical, Canonical::Number(42.0));
  }

  #[test]
  fn numeric_fraction_form_is_exact() {
    assert!(grade_numeric("1/2", "1/2", 0.0, AnswerForm::Fraction).correct);
    assert!(grade_numeric("2/4", "1/2", 0.0, AnswerForm::Fraction).correct);
    assert!(grade_numeric("0.5", "1/2", 0.0, AnswerForm::Fraction).correct);
    let r = grade_numeric("0.49", "1/2", 0.5, AnswerForm::Fraction);
    assert_eq!(r.feedback_code, FeedbackCode::NumMismatch);
    assert_eq!(r.canonical, Canonical::Text("1/2".into()));
  }

  #[test]
  fn numeric_incorrect() {
    let r = grade_numeric("41", "42", 0.0, AnswerForm::Int);
    assert!(!r.correct);
    assert_eq!(r.feedback_code, FeedbackCode::NumMismatch);
  }

  #[test]
  fn numeric_parse_error() {
    let r = grade_numeric("not_a_number", "42", 0.0, AnswerForm::Int);
    assert!(!r.correct);
    assert_eq!(r.feedback_code, FeedbackCode::ParseError);
    assert_eq!(grade_numeric("1/0", "42", 0.0, AnswerForm::Decimal).feedback_code, FeedbackCode::ParseError);
  }

  #[test]
  fn numeric_accepts_typographic_minus() {
    assert!(grade_numeric("\u{2212}3", "-3", 0.0, AnswerForm::Int).correct);
    assert!(grade_numeric("\u{2212}2.5", "-2.5", 0.01, AnswerForm::Decimal).correct);
    assert!(grade_numeric("\u{2212}5/2", "-5/2", 0.0, AnswerForm::Fraction).correct);
  }

  #[test]
  fn numeric_tolerance_boundary_is_inclusive() {
    assert!(grade_numeric("3.34", "3.3333333333333335", 0.01, AnswerForm::Decimal).correct);
    assert!(grade_numeric("5.01", "5", 0.01, AnswerForm::Decimal).correct);
    assert!(!grade_numeric("5.011", "5", 0.01, AnswerForm::Decimal).correct);
    assert!(grade_numeric("7/2", "3.5", 0.0, AnswerForm::Decimal).correct);
    assert!(grade_numeric("1e1", "10", 0.0, AnswerForm::Decimal).correct);
  }

  #[test]
  fn expression_grading() {
    assert!(grade_expression("x + 1", "1 + x").correct);
    assert!(grade_expression("2*x", "x*2").correct);
    let r = grade_expression("x + 1", "x + 2");
    assert_eq!(r.feedback_code, FeedbackCode::ExprMismatch);
    assert_eq!(grade_expression("x +* 1", "x + 1").feedback_code, FeedbackCode::ParseError);
  }

  #[test]
  fn mc_grading() {
    let single = |s: &str| McChoice::Single(s.into());
    let multi = |v: &[&str]| McChoice::Multi(v.iter().map(|s| s.to_string()).collect());
    let r = grade_mc(&single("A"), &single("A"));
    assert!(r.correct);
    assert_eq!(r.canonical, Canonical::Text("A".into()));
    let r = grade_mc(&single("B"), &single("A"));
    assert_eq!(r.feedback_code, FeedbackCode::McWrong);
    assert!(grade_mc(&multi(&["A", "B"]), &multi(&["A", "B"])).correct);
    assert!(grade_mc(&multi(&["B", "A", "B"]), &multi(&["A", "B"])).correct);
    assert!(!grade_mc(&multi(&["A"]), &multi(&["A", "B"])).correct);
    assert!(!grade_mc(&single("A"), &multi(&["A"])).correct);
  }

  #[test]
  fn plot_grading() {
    assert!(grade_plot(Point { x: 1.0, y: 2.0 }, Point { x: 1.1, y: 2.1 }, 0.2).correct);
    let r = grade_plot(Point { x: 1.0, y: 2.0 }, Point { x: 3.0, y: 4.0 }, 0.2);
    assert!(!r.correct);
    assert_eq!(r.feedback_code, FeedbackCode::PlotOff);
    assert_eq!(parse_point("(3, -2)"), Some(Point { x: 3.0, y: -2.0 }));
    assert_eq!(parse_point("1/2, 4"), Some(Point { x: 0.5, y: 4.0 }));
    assert_eq!(parse_point("3"), None);
  }

  #[test]
  fn item_level_dispatch() {
    let num = item(ItemType::Numeric, Answer::Decimal(10.0 / 3.0), Some(0.01));
    assert!(grade_item(&num, &Submission::Text("3.33".into()), DEFAULT_PLOT_TOLERANCE).correct);
    assert!(grade_item(&num, &Submission::Number(3.333), DEFAULT_PLOT_TOLERANCE).correct);
    assert_eq!(
      grade_item(&num, &Submission::Choices(vec![]), DEFAULT_PLOT_TOLERANCE).feedback_code,
      FeedbackCode::ParseError
    );

    let mut mc = item(ItemType::Mc, Answer::Choices(vec!["x + 3 = 7".into(), "2y = 10".into()]), None);
    mc.options = vec![
      McOption { label: "A".into(), value: "x + 3 = 7".into(), correct: true, rationale: String::new() },
      McOption { label: "B".into(), value: "4x - 2".into(), correct: false, rationale: String::new() },
      McOption { label: "C".into(), value: "2y = 10".into(), correct: true, rationale: String::new() },
    ];
    let labels = Submission::Choices(vec!["c".into(), "A".into()]);
    assert!(grade_item(&mc, &labels, DEFAULT_PLOT_TOLERANCE).correct);
    let values = Submission::Choices(vec!["2y = 10".into(), "x + 3 = 7".into()]);
    assert!(grade_item(&mc, &values, DEFAULT_PLOT_TOLERANCE).correct);
    assert!(!grade_item(&mc, &Submission::Text("A".into()), DEFAULT_PLOT_TOLERANCE).correct);

    let plot = item(ItemType::Plot, Answer::Point(Point { x: 3.0, y: -2.0 }), None);
    assert!(grade_item(&plot, &Submission::Point(Point { x: 3.1, y: -2.1 }), DEFAULT_PLOT_TOLERANCE).correct);
    assert!(grade_item(&plot, &Submission::Text("(3, -2)".into()), DEFAULT_PLOT_TOLERANCE).correct);
    assert!(!grade_item(&plot, &Submission::Point(Point { x: 3.0, y: -1.0 }), DEFAULT_PLOT_TOLERANCE).correct);

    let ex = item(ItemType::Expression, Answer::Expression("3x + 12".into()), None);
    assert!(grade_item(&ex, &Submission::Text("3(x + 4)".into()), DEFAULT_PLOT_TOLERANCE).correct);
  }

  #[test]
  fn submissions_deserialize_by_shape() {
    let parse = |s: &str| serde_json::from_str::<Submission>(s).unwrap();
    assert_eq!(parse("40"), Submission::Number(40.0));
    assert_eq!(parse("\"7/2\""), Submission::Text("7/2".into()));
    assert_eq!(parse("[\"A\", \"C\"]"), Submission::Choices(vec!["A".into(), "C".into()]));
    assert_eq!(parse("{\"x\": 1, \"y\": -2}"), Submission::Point(Point { x: 1.0, y: -2.0 }));
    let json = serde_json::to_value(grade_numeric("1", "1", 0.0, AnswerForm::Int)).unwrap();
    assert_eq!(json["feedback_code"], "OK");
  }

  proptest! {
    #[test]
    fn tolerance_boundary(k in -1000i64..1000, t in 0i128..100) {
      let key = Fraction::from_integer(k);
      let tol = Fraction::new(t, 100).unwrap();
      let at = key.checked_add(tol).unwrap().to_decimal_string().unwrap();
      let past = key.checked_add(tol).unwrap().checked_add(Fraction::new(1, 1000).unwrap()).unwrap().to_decimal_string().unwrap();
      let tolerance = t as f64 / 100.0;
      prop_assert!(grade_numeric(&at, &k.to_string(), tolerance, AnswerForm::Decimal).correct);
      prop_assert!(!grade_numeric(&past, &k.to_string(), tolerance, AnswerForm::Decimal).correct);
    }

    #[test]
    fn mc_is_order_independent(mut picks in proptest::collection::vec("[a-e]", 1..5)) {
      let correct = McChoice::Multi(picks.clone());
      picks.reverse();
      prop_assert!(grade_mc(&McChoice::Multi(picks), &correct).correct);
    }
  }
}
