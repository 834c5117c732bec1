//! Domain models: templates, sampled parameters, answers and generated items.

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::fraction::Fraction;
use crate::util::fmt_number;

/// How the learner answers an item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
  /// A single number (integer, decimal or fraction).
  Numeric,
  /// Multiple choice, possibly select-all.
  Mc,
  /// An algebraic expression graded by symbolic equivalence.
  Expression,
  /// A point on the coordinate plane.
  Plot,
}

impl ItemType {
  pub fn as_str(&self) -> &'static str {
    match self {
      ItemType::Numeric => "numeric",
      ItemType::Mc => "mc",
      ItemType::Expression => "expression",
      ItemType::Plot => "plot",
    }
  }
}

impl FromStr for ItemType {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "numeric" => Ok(ItemType::Numeric),
      "mc" => Ok(ItemType::Mc),
      "expression" => Ok(ItemType::Expression),
      "plot" => Ok(ItemType::Plot),
      other => Err(format!("unknown item type {other:?}")),
    }
  }
}

/// Closed set of answer rules a template can select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeRule {
  TrapezoidArea,
  UnitRate,
  OneStepEquation,
  RationalOp,
  ClassifyEquations,
  Distribute,
  PlotPoint,
}

impl ComputeRule {
  pub const ALL: [ComputeRule; 7] = [
    ComputeRule::TrapezoidArea,
    ComputeRule::UnitRate,
    ComputeRule::OneStepEquation,
    ComputeRule::RationalOp,
    ComputeRule::ClassifyEquations,
    ComputeRule::Distribute,
    ComputeRule::PlotPoint,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ComputeRule::TrapezoidArea => "trapezoid_area",
      ComputeRule::UnitRate => "unit_rate",
      ComputeRule::OneStepEquation => "one_step_equation",
      ComputeRule::RationalOp => "rational_op",
      ComputeRule::ClassifyEquations => "classify_equations",
      ComputeRule::Distribute => "distribute",
      ComputeRule::PlotPoint => "plot_point",
    }
  }
}

impl FromStr for ComputeRule {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let tag = s.trim();
    ComputeRule::ALL
      .into_iter()
      .find(|rule| rule.as_str() == tag)
      .ok_or_else(|| tag.to_string())
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerForm {
  Int,
  #[default]
  Decimal,
  Fraction,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerFormat {
  #[serde(default)]
  pub form: AnswerForm,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub tolerance: Option<f64>,
}

/// A concrete parameter value, either sampled or fixed by the template.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
  Int(i64),
  Float(f64),
  Text(String),
  List(Vec<ParamValue>),
}

impl fmt::Display for ParamValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ParamValue::Int(n) => write!(f, "{n}"),
      ParamValue::Float(x) => f.write_str(&fmt_number(*x)),
      ParamValue::Text(s) => f.write_str(s),
      ParamValue::List(items) => {
        let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
        f.write_str(&parts.join(", "))
      }
    }
  }
}

/// Domain a template parameter is drawn from.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamDomain {
  /// Uniform integer in `[min, max]`.
  Range { min: i64, max: i64 },
  /// Uniform pick of one value.
  Choices(Vec<ParamValue>),
  /// `count` distinct picks, kept as a list value.
  Pick { choices: Vec<ParamValue>, count: usize },
  /// Literal, returned as-is.
  Fixed(ParamValue),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
  #[serde(default)]
  pub ask: String,
}

/// One problem family. Immutable once loaded.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
  pub id: String,
  pub teks: String,
  pub kind: ItemType,
  pub compute: ComputeRule,
  /// Sorted by name so draws happen in a stable order.
  pub params: BTreeMap<String, ParamDomain>,
  pub answer_format: AnswerFormat,
  pub difficulty: u8,
  pub presentation: Presentation,
}

/// Parameters sampled for one generation call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
  pub fn new() -> Self { Self::default() }

  pub fn get(&self, name: &str) -> Option<&ParamValue> { self.0.get(name) }

  pub fn contains(&self, name: &str) -> bool { self.0.contains_key(name) }

  pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
    self.0.insert(name.into(), value);
  }

  pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> { self.0.iter() }

  fn require(&self, name: &str) -> Result<&ParamValue, GenerationError> {
    self.0.get(name).ok_or_else(|| GenerationError::MissingParam(name.to_string()))
  }

  fn invalid(name: &str, reason: impl Into<String>) -> GenerationError {
    GenerationError::InvalidParam { name: name.to_string(), reason: reason.into() }
  }

  pub fn int(&self, name: &str) -> Result<i64, GenerationError> {
    match self.require(name)? {
      ParamValue::Int(n) => Ok(*n),
      ParamValue::Text(s) => s.trim().parse().map_err(|_| Self::invalid(name, "expected an integer")),
      _ => Err(Self::invalid(name, "expected an integer")),
    }
  }

  /// Integer parameter, or `default` when absent.
  pub fn int_or(&self, name: &str, default: i64) -> Result<i64, GenerationError> {
    if self.contains(name) { self.int(name) } else { Ok(default) }
  }

  pub fn fraction(&self, name: &str) -> Result<Fraction, GenerationError> {
    match self.require(name)? {
      ParamValue::Int(n) => Ok(Fraction::from_integer(*n)),
      ParamValue::Float(x) => Fraction::from_f64(*x).ok_or_else(|| Self::invalid(name, "not a finite number")),
      ParamValue::Text(s) => s.parse().map_err(|e| Self::invalid(name, format!("{e}"))),
      ParamValue::List(_) => Err(Self::invalid(name, "expected a number")),
    }
  }

  pub fn number(&self, name: &str) -> Result<f64, GenerationError> {
    match self.require(name)? {
      ParamValue::Int(n) => Ok(*n as f64),
      ParamValue::Float(x) => Ok(*x),
      _ => self.fraction(name).map(|f| f.to_f64()),
    }
  }

  pub fn text(&self, name: &str) -> Result<&str, GenerationError> {
    match self.require(name)? {
      ParamValue::Text(s) => Ok(s),
      _ => Err(Self::invalid(name, "expected text")),
    }
  }

  pub fn list(&self, name: &str) -> Result<&[ParamValue], GenerationError> {
    match self.require(name)? {
      ParamValue::List(items) => Ok(items),
      _ => Err(Self::invalid(name, "expected a list")),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl fmt::Display for Point {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({}, {})", fmt_number(self.x), fmt_number(self.y))
  }
}

/// Canonical correct value of an item. The variant follows the template's
/// answer form and item type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
  Integer(i64),
  Decimal(f64),
  Fraction(Fraction),
  /// Values of every correct multiple-choice option.
  Choices(Vec<String>),
  Expression(String),
  Point(Point),
}

impl Answer {
  /// Text handed to the grader as the key.
  pub fn key_text(&self) -> String {
    match self {
      Answer::Integer(n) => n.to_string(),
      Answer::Decimal(x) => x.to_string(),
      Answer::Fraction(f) => f.to_string(),
      Answer::Choices(values) => values.join("; "),
      Answer::Expression(e) => e.clone(),
      Answer::Point(p) => p.to_string(),
    }
  }

  /// Alternate accepted spellings of the answer.
  pub fn equivalents(&self) -> Vec<String> {
    match self {
      Answer::Integer(n) => vec![n.to_string(), format!("{n}.0")],
      Answer::Decimal(x) => {
        let mut out = vec![fmt_number(*x)];
        let full = x.to_string();
        if !out.contains(&full) {
          out.push(full);
        }
        out
      }
      Answer::Fraction(f) => {
        let mut out = vec![f.to_string()];
        if let Some(dec) = f.to_decimal_string() {
          if !out.contains(&dec) {
            out.push(dec);
          }
        }
        out
      }
      Answer::Choices(values) => values.clone(),
      Answer::Expression(e) => vec![e.clone()],
      Answer::Point(p) => vec![p.to_string()],
    }
  }
}

impl fmt::Display for Answer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Answer::Decimal(x) => f.write_str(&fmt_number(*x)),
      Answer::Choices(values) => f.write_str(&values.join(", ")),
      other => f.write_str(&other.key_text()),
    }
  }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct McOption {
  pub label: String,
  pub value: String,
  pub correct: bool,
  pub rationale: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
  Trapezoid { b1: i64, b2: i64, h: i64, units: String },
  NumberLine { min: i64, max: i64, highlight: Vec<f64> },
  CoordinatePlane { x_min: i64, x_max: i64, y_min: i64, y_max: i64, points: Vec<Point> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
  #[serde(flatten)]
  pub shape: Shape,
  pub svg: String,
}

/// Non-answer content shown to the learner.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
  pub context: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub diagram: Option<Diagram>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Safety {
  pub moderation_passed: bool,
}

/// A fully rendered practice question. Immutable once returned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
  pub id: String,
  pub teks: String,
  #[serde(rename = "type")]
  pub kind: ItemType,
  pub template_id: String,
  pub seed: u64,
  pub params: Params,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub stimulus: Option<Stimulus>,
  pub prompt: String,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub options: Vec<McOption>,
  pub answer: Answer,
  pub answer_equivalents: Vec<String>,
  pub answer_format: AnswerFormat,
  pub hints: Vec<String>,
  pub explanation: String,
  pub difficulty: u8,
  pub tags: Vec<String>,
  pub safety: Safety,
}

impl Item {
  pub fn make_id(teks: &str, template_id: &str, seed: u64) -> String {
    format!("itm_{teks}_{template_id}_{seed}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn compute_rule_tags_round_trip() {
    for rule in ComputeRule::ALL {
      assert_eq!(rule.as_str().parse::<ComputeRule>(), Ok(rule));
    }
    assert_eq!("A = (b1 + b2)/2 * h".parse::<ComputeRule>(), Err("A = (b1 + b2)/2 * h".to_string()));
  }

  #[test]
  fn params_accessors_coerce_where_sensible() {
    let mut p = Params::new();
    p.insert("a", ParamValue::Int(3));
    p.insert("b", ParamValue::Text("-7/2".into()));
    p.insert("op", ParamValue::Text("÷".into()));
    assert_eq!(p.int("a").unwrap(), 3);
    assert_eq!(p.fraction("b").unwrap().to_string(), "-7/2");
    assert_eq!(p.number("b").unwrap(), -3.5);
    assert_eq!(p.int_or("missing", 9).unwrap(), 9);
    assert!(matches!(p.int("op"), Err(GenerationError::InvalidParam { .. })));
    assert_eq!(p.text("zz"), Err(GenerationError::MissingParam("zz".into())));
  }

  #[test]
  fn answer_equivalents() {
    let half: Fraction = "7/2".parse().unwrap();
    assert_eq!(Answer::Fraction(half).equivalents(), vec!["7/2", "3.5"]);
    assert_eq!(Answer::Integer(40).equivalents(), vec!["40", "40.0"]);
    assert_eq!(Answer::Decimal(2.5).key_text(), "2.5");
  }

  #[test]
  fn answer_serializes_with_kind_tag() {
    let json = serde_json::to_value(Answer::Integer(40)).unwrap();
    assert_eq!(json, serde_json::json!({"kind": "integer", "value": 40}));
  }
}
