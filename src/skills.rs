//! Per-skill strategies.
//!
//! Each TEKS code registers one `Skill`: parameter overrides, context and
//! prompt wording, hints, explanation wording, MC option classification and the
//! optional diagram. Skills without a registration fall back to `GenericSkill`.

use std::collections::HashMap;

use rand::{seq::SliceRandom, Rng};

use crate::domain::{Answer, ParamValue, Params, Shape, Template};
use crate::error::GenerationError;
use crate::sampler::ItemRng;
use crate::solver::{is_equation, ComputeMeta, EquationForm};
use crate::util::{fill_template, fmt_number};

/// Fill `{name}` placeholders from the sampled parameters.
pub fn fill(tpl: &str, params: &Params) -> String {
  let owned: Vec<(String, String)> = params.iter().map(|(k, v)| (k.clone(), v.to_string())).collect();
  let pairs: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
  fill_template(tpl, &pairs)
}

pub trait Skill: Send + Sync {
  fn teks(&self) -> &'static str;

  fn tags(&self) -> &'static [&'static str];

  /// Context sentence variants with `{param}` placeholders.
  fn contexts(&self) -> &'static [&'static str];

  /// Candidates for the first hint.
  fn hint_variants(&self) -> &'static [&'static str];

  /// Extra draws layered on top of the generic domain draw.
  fn sample_extra(&self, _params: &mut Params, _rng: &mut ItemRng) -> Result<(), GenerationError> {
    Ok(())
  }

  fn build_context(&self, params: &Params, rng: &mut ItemRng) -> String {
    self.contexts().choose(rng).map(|tpl| fill(tpl, params)).unwrap_or_default()
  }

  fn build_prompt(&self, template: &Template, params: &Params) -> Result<String, GenerationError> {
    let ask = if template.presentation.ask.trim().is_empty() {
      "Answer the question."
    } else {
      template.presentation.ask.as_str()
    };
    Ok(fill(ask, params))
  }

  /// Fixed, parameter-specific hints following the first one.
  fn extra_hints(&self, _params: &Params) -> Result<Vec<String>, GenerationError> {
    Ok(Vec::new())
  }

  fn build_hints(&self, params: &Params, rng: &mut ItemRng) -> Result<Vec<String>, GenerationError> {
    let mut hints: Vec<String> = self.hint_variants().choose(rng).map(|h| fill(h, params)).into_iter().collect();
    hints.extend(self.extra_hints(params)?);
    Ok(hints)
  }

  fn answer_sentence(&self, _params: &Params, answer: &Answer) -> String {
    format!("The answer is {answer}.")
  }

  fn build_explanation(&self, params: &Params, answer: &Answer, meta: &ComputeMeta) -> String {
    let mut parts = meta.steps.clone();
    parts.push(self.answer_sentence(params, answer));
    parts.join(" ")
  }

  /// Candidate values offered as MC options.
  fn option_values(&self, params: &Params) -> Result<Vec<String>, GenerationError> {
    Ok(params.list("options")?.iter().map(|v| v.to_string()).collect())
  }

  /// `(correct, rationale)` for one MC option.
  fn classify_option(&self, value: &str, answer: &Answer) -> (bool, String) {
    match answer {
      Answer::Choices(correct) if correct.iter().any(|c| c == value) => {
        (true, format!("{value} is a correct choice."))
      }
      _ => (false, format!("{value} does not fit the question.")),
    }
  }

  fn diagram(&self, _params: &Params) -> Result<Option<Shape>, GenerationError> {
    Ok(None)
  }
}

/// Registry of skills keyed by TEKS code. Built once at startup.
pub struct SkillRegistry {
  by_teks: HashMap<&'static str, Box<dyn Skill>>,
  fallback: GenericSkill,
}

impl SkillRegistry {
  pub fn empty() -> Self {
    Self { by_teks: HashMap::new(), fallback: GenericSkill }
  }

  pub fn builtin() -> Self {
    let mut reg = Self::empty();
    reg.register(Box::new(RationalOps));
    reg.register(Box::new(UnitRates));
    reg.register(Box::new(ExpressionsVsEquations));
    reg.register(Box::new(EquivalentExpressions));
    reg.register(Box::new(TrapezoidArea));
    reg.register(Box::new(OneStepEquations));
    reg.register(Box::new(CoordinatePlane));
    reg
  }

  pub fn register(&mut self, skill: Box<dyn Skill>) {
    self.by_teks.insert(skill.teks(), skill);
  }

  /// Registered skill for `teks`, or the generic fallback.
  pub fn get(&self, teks: &str) -> &dyn Skill {
    match self.by_teks.get(teks) {
      Some(skill) => skill.as_ref(),
      None => &self.fallback,
    }
  }

  pub fn is_registered(&self, teks: &str) -> bool {
    self.by_teks.contains_key(teks)
  }
}

impl Default for SkillRegistry {
  fn default() -> Self { Self::builtin() }
}

// ---------------- generic ----------------

pub struct GenericSkill;

impl Skill for GenericSkill {
  fn teks(&self) -> &'static str { "*" }
  fn tags(&self) -> &'static [&'static str] { &["practice"] }
  fn contexts(&self) -> &'static [&'static str] { &["Work through the problem below."] }
  fn hint_variants(&self) -> &'static [&'static str] { &["Think step by step.", "Check your work when you finish."] }
}

// ---------------- 6.2 rational numbers ----------------

pub struct RationalOps;

impl Skill for RationalOps {
  fn teks(&self) -> &'static str { "6.2" }
  fn tags(&self) -> &'static [&'static str] { &["rational_numbers", "operations"] }

  fn contexts(&self) -> &'static [&'static str] {
    &[
      "Calculate the following expression.",
      "Solve this math problem.",
      "Find the value of the expression.",
    ]
  }

  fn hint_variants(&self) -> &'static [&'static str] {
    &[
      "Follow the order of operations.",
      "Be careful with positive and negative numbers.",
      "Double-check your arithmetic.",
    ]
  }

  fn build_prompt(&self, _template: &Template, params: &Params) -> Result<String, GenerationError> {
    let (a, b, op) = (params.fraction("a")?, params.fraction("b")?, params.text("op")?);
    let b = if b.numer() < 0 { format!("({b})") } else { b.to_string() };
    Ok(format!("Compute {a} {op} {b}."))
  }

  fn extra_hints(&self, params: &Params) -> Result<Vec<String>, GenerationError> {
    let tip = match params.text("op")? {
      "+" => "Adding a negative number is the same as subtracting its opposite.",
      "-" | "−" => "Subtracting a number is the same as adding its opposite.",
      "×" | "*" => "The product of two numbers with the same sign is positive.",
      _ => "The quotient of two numbers with the same sign is positive. Round to the nearest hundredth if needed.",
    };
    Ok(vec![tip.to_string()])
  }

  fn diagram(&self, params: &Params) -> Result<Option<Shape>, GenerationError> {
    let (a, b) = (params.number("a")?, params.number("b")?);
    let min = (a.min(b).floor() as i64).min(-10);
    let max = (a.max(b).ceil() as i64).max(10);
    Ok(Some(Shape::NumberLine { min, max, highlight: vec![a, b] }))
  }
}

// ---------------- 6.4 unit rates ----------------

/// (quantity, per-unit singular, per-unit plural)
const RATE_SCENARIOS: &[(&str, &str, &str)] = &[
  ("miles", "hour", "hours"),
  ("dollars", "pound", "pounds"),
  ("pages", "minute", "minutes"),
  ("liters", "minute", "minutes"),
  ("cookies", "batch", "batches"),
];

pub struct UnitRates;

impl Skill for UnitRates {
  fn teks(&self) -> &'static str { "6.4" }
  fn tags(&self) -> &'static [&'static str] { &["proportionality", "unit_rate"] }

  fn contexts(&self) -> &'static [&'static str] {
    &[
      "Maya records {y} {units_y} over {x} {units_x_plural} at a constant rate.",
      "At a steady pace, the total reaches {y} {units_y} after {x} {units_x_plural}.",
      "A table shows that {x} {units_x_plural} correspond to {y} {units_y}.",
    ]
  }

  fn hint_variants(&self) -> &'static [&'static str] {
    &["Divide the total by the number of units.", "A unit rate is the amount for exactly 1 unit."]
  }

  fn sample_extra(&self, params: &mut Params, rng: &mut ItemRng) -> Result<(), GenerationError> {
    if !params.contains("units_y") || !params.contains("units_x") {
      let (y_units, x_unit, x_plural) = RATE_SCENARIOS[rng.gen_range(0..RATE_SCENARIOS.len())];
      params.insert("units_y", ParamValue::Text(y_units.into()));
      params.insert("units_x", ParamValue::Text(x_unit.into()));
      params.insert("units_x_plural", ParamValue::Text(x_plural.into()));
    } else if !params.contains("units_x_plural") {
      let plural = format!("{}s", params.text("units_x")?);
      params.insert("units_x_plural", ParamValue::Text(plural));
    }
    Ok(())
  }

  fn build_prompt(&self, _template: &Template, params: &Params) -> Result<String, GenerationError> {
    Ok(format!(
      "What is the unit rate in {} per {}?",
      params.text("units_y")?,
      params.text("units_x")?
    ))
  }

  fn extra_hints(&self, params: &Params) -> Result<Vec<String>, GenerationError> {
    Ok(vec![format!("Divide {} by {}.", params.number("y").map(fmt_number)?, params.number("x").map(fmt_number)?)])
  }

  fn answer_sentence(&self, params: &Params, answer: &Answer) -> String {
    match (params.text("units_y"), params.text("units_x")) {
      (Ok(y), Ok(x)) => format!("The unit rate is {answer} {y} per {x}."),
      _ => format!("The unit rate is {answer}."),
    }
  }
}

// ---------------- 6.7B expressions vs equations ----------------

pub struct ExpressionsVsEquations;

impl Skill for ExpressionsVsEquations {
  fn teks(&self) -> &'static str { "6.7B" }
  fn tags(&self) -> &'static [&'static str] { &["expressions", "equations"] }

  fn contexts(&self) -> &'static [&'static str] {
    &[
      "Look at the following mathematical statements.",
      "Consider these algebraic statements.",
      "Examine the mathematical forms below.",
    ]
  }

  fn hint_variants(&self) -> &'static [&'static str] {
    &[
      "An equation has an equals sign (=).",
      "An expression does not have an equals sign.",
      "Look for the = symbol to identify equations.",
    ]
  }

  fn build_prompt(&self, _template: &Template, _params: &Params) -> Result<String, GenerationError> {
    Ok("Select all that are equations.".to_string())
  }

  fn extra_hints(&self, _params: &Params) -> Result<Vec<String>, GenerationError> {
    Ok(vec!["Check each choice for an equals sign before you decide.".to_string()])
  }

  fn answer_sentence(&self, _params: &Params, answer: &Answer) -> String {
    format!("The equations are: {answer}.")
  }

  fn option_values(&self, params: &Params) -> Result<Vec<String>, GenerationError> {
    Ok(params.list("forms")?.iter().map(|v| v.to_string()).collect())
  }

  fn classify_option(&self, value: &str, _answer: &Answer) -> (bool, String) {
    if is_equation(value) {
      (true, format!("{value} has an equals sign, so it is an equation."))
    } else {
      (false, format!("{value} has no equals sign, so it is an expression."))
    }
  }
}

// ---------------- 6.7D equivalent expressions ----------------

pub struct EquivalentExpressions;

impl Skill for EquivalentExpressions {
  fn teks(&self) -> &'static str { "6.7D" }
  fn tags(&self) -> &'static [&'static str] { &["expressions", "distributive_property"] }

  fn contexts(&self) -> &'static [&'static str] {
    &[
      "Use the distributive property.",
      "Rewrite the expression so it has no parentheses.",
      "Two expressions are equivalent when they have the same value for every x.",
    ]
  }

  fn hint_variants(&self) -> &'static [&'static str] {
    &[
      "Multiply the number outside the parentheses by each term inside.",
      "The distributive property says a(x + b) = ax + ab.",
    ]
  }

  fn build_prompt(&self, _template: &Template, params: &Params) -> Result<String, GenerationError> {
    let (a, b) = (params.int("a")?, params.int("b")?);
    let inner = if b < 0 { format!("x - {}", -b) } else { format!("x + {b}") };
    Ok(format!("Write an expression equivalent to {a}({inner}) without parentheses."))
  }

  fn extra_hints(&self, params: &Params) -> Result<Vec<String>, GenerationError> {
    let (a, b) = (params.int("a")?, params.int("b")?);
    Ok(vec![format!("Multiply {a} by x, then multiply {a} by {b}.")])
  }

  fn answer_sentence(&self, _params: &Params, answer: &Answer) -> String {
    format!("An equivalent expression is {answer}.")
  }
}

// ---------------- 6.8B trapezoid area ----------------

pub struct TrapezoidArea;

impl TrapezoidArea {
  fn bounds(params: &Params, name: &str, lo: i64, hi: i64) -> Result<(i64, i64), GenerationError> {
    let min = params.int_or(&format!("{name}_min"), lo)?;
    let max = params.int_or(&format!("{name}_max"), hi)?;
    if min > max || min <= 0 {
      return Err(GenerationError::TemplateSchemaError(format!(
        "{name} bounds must be positive and ordered, got {min}..{max}"
      )));
    }
    Ok((min, max))
  }
}

impl Skill for TrapezoidArea {
  fn teks(&self) -> &'static str { "6.8B" }
  fn tags(&self) -> &'static [&'static str] { &["area", "trapezoid", "formulas"] }

  fn contexts(&self) -> &'static [&'static str] {
    &[
      "A garden bed is shaped like a trapezoid with bases {b1} {units} and {b2} {units} and a height of {h} {units}.",
      "A sandbox is a trapezoid. Its parallel sides are {b1} {units} and {b2} {units} long and it is {h} {units} tall.",
      "A tabletop is shaped like a trapezoid with bases of {b1} {units} and {b2} {units} and a height of {h} {units}.",
    ]
  }

  fn hint_variants(&self) -> &'static [&'static str] {
    &["Area of a trapezoid = (b1 + b2) ÷ 2 × h.", "Area equals the average of the bases times the height."]
  }

  fn sample_extra(&self, params: &mut Params, rng: &mut ItemRng) -> Result<(), GenerationError> {
    let defaults = [("b1", 4, 14), ("b2", 6, 18), ("h", 3, 9)];
    let mut h_bounds = (3, 9);
    for (name, lo, hi) in defaults {
      let (min, max) = Self::bounds(params, name, lo, hi)?;
      if name == "h" {
        h_bounds = (min, max);
      }
      if !params.contains(name) {
        params.insert(name, ParamValue::Int(rng.gen_range(min..=max)));
      }
    }
    if !params.contains("units") {
      let units = ["cm", "m"][rng.gen_range(0..2)];
      params.insert("units", ParamValue::Text(units.into()));
    }

    // keep (b1 + b2) * h even so the area is a whole number
    let (b1, b2, h) = (params.int("b1")?, params.int("b2")?, params.int("h")?);
    if (b1 + b2) % 2 != 0 && h % 2 != 0 {
      let nudged = if h + 1 <= h_bounds.1 { h + 1 } else if h - 1 >= h_bounds.0 { h - 1 } else { h };
      params.insert("h", ParamValue::Int(nudged));
    }
    Ok(())
  }

  fn build_prompt(&self, _template: &Template, params: &Params) -> Result<String, GenerationError> {
    Ok(format!("Find the area of the trapezoid in square {}.", params.text("units")?))
  }

  fn extra_hints(&self, params: &Params) -> Result<Vec<String>, GenerationError> {
    let (b1, b2, h) = (params.int("b1")?, params.int("b2")?, params.int("h")?);
    Ok(vec![
      "Add the two bases first, then multiply by the height and divide by 2.".to_string(),
      format!("The bases are {b1} and {b2}; the height is {h}."),
    ])
  }

  fn answer_sentence(&self, params: &Params, answer: &Answer) -> String {
    match params.text("units") {
      Ok(units) => format!("The area is {answer} square {units}."),
      Err(_) => format!("The area is {answer}."),
    }
  }

  fn diagram(&self, params: &Params) -> Result<Option<Shape>, GenerationError> {
    Ok(Some(Shape::Trapezoid {
      b1: params.int("b1")?,
      b2: params.int("b2")?,
      h: params.int("h")?,
      units: params.text("units")?.to_string(),
    }))
  }
}

// ---------------- 6.9A one-step equations ----------------

pub struct OneStepEquations;

impl OneStepEquations {
  fn equation(params: &Params) -> Result<(EquationForm, String, String), GenerationError> {
    let form: EquationForm = params.text("form")?.parse()?;
    let (p, q) = form.operand_names();
    Ok((form, params.fraction(p)?.to_string(), params.fraction(q)?.to_string()))
  }
}

impl Skill for OneStepEquations {
  fn teks(&self) -> &'static str { "6.9A" }
  fn tags(&self) -> &'static [&'static str] { &["equations", "solving"] }

  fn contexts(&self) -> &'static [&'static str] {
    &[
      "Solve for the unknown variable.",
      "Find the value of x that makes the equation true.",
      "Determine the solution to the equation.",
    ]
  }

  fn hint_variants(&self) -> &'static [&'static str] {
    &[
      "Isolate the variable on one side.",
      "Use inverse operations to solve.",
      "Whatever you do to one side, do to the other side.",
    ]
  }

  fn build_prompt(&self, _template: &Template, params: &Params) -> Result<String, GenerationError> {
    let (form, p, q) = Self::equation(params)?;
    Ok(format!("Solve for x: {}.", form.render(&p, &q)))
  }

  fn extra_hints(&self, params: &Params) -> Result<Vec<String>, GenerationError> {
    let (form, p, _) = Self::equation(params)?;
    let step = match form {
      EquationForm::AddConst => format!("Subtract {p} from both sides."),
      EquationForm::SubConst => format!("Add {p} to both sides."),
      EquationForm::Scale => format!("Divide both sides by {p}."),
      EquationForm::Divide => format!("Multiply both sides by {p}."),
    };
    Ok(vec![step])
  }

  fn answer_sentence(&self, _params: &Params, answer: &Answer) -> String {
    format!("The solution is x = {answer}.")
  }
}

// ---------------- 6.11 coordinate plane ----------------

pub struct CoordinatePlane;

impl Skill for CoordinatePlane {
  fn teks(&self) -> &'static str { "6.11" }
  fn tags(&self) -> &'static [&'static str] { &["coordinate_plane", "graphing"] }

  fn contexts(&self) -> &'static [&'static str] {
    &[
      "A treasure map is drawn on a coordinate grid.",
      "A city map uses a coordinate grid with the park at the origin.",
      "Use the coordinate plane below.",
    ]
  }

  fn hint_variants(&self) -> &'static [&'static str] {
    &[
      "The first number tells you how far to move left or right.",
      "Always start at the origin (0, 0).",
    ]
  }

  fn build_prompt(&self, _template: &Template, params: &Params) -> Result<String, GenerationError> {
    Ok(format!("Plot the point ({}, {}).", fmt_number(params.number("x")?), fmt_number(params.number("y")?)))
  }

  fn extra_hints(&self, _params: &Params) -> Result<Vec<String>, GenerationError> {
    Ok(vec!["The second number tells you how far to move up or down.".to_string()])
  }

  fn answer_sentence(&self, _params: &Params, answer: &Answer) -> String {
    format!("That lands on the point {answer}.")
  }

  fn diagram(&self, params: &Params) -> Result<Option<Shape>, GenerationError> {
    let (x, y) = (params.number("x")?, params.number("y")?);
    let lo = params.int_or("axis_min", -5)?;
    let hi = params.int_or("axis_max", 5)?;
    Ok(Some(Shape::CoordinatePlane {
      x_min: lo.min(x.floor() as i64),
      x_max: hi.max(x.ceil() as i64),
      y_min: lo.min(y.floor() as i64),
      y_max: hi.max(y.ceil() as i64),
      points: Vec::new(),
    }))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sampler::rng_for_seed;

  fn params(pairs: &[(&str, ParamValue)]) -> Params {
    let mut p = Params::new();
    for (k, v) in pairs {
      p.insert(*k, v.clone());
    }
    p
  }

  #[test]
  fn registry_falls_back_to_generic() {
    let reg = SkillRegistry::builtin();
    for teks in ["6.2", "6.4", "6.7B", "6.7D", "6.8B", "6.9A", "6.11"] {
      assert!(reg.is_registered(teks));
      assert_eq!(reg.get(teks).teks(), teks);
    }
    assert_eq!(reg.get("6.99").teks(), "*");
  }

  #[test]
  fn trapezoid_override_keeps_area_whole() {
    let skill = TrapezoidArea;
    for seed in 0..200 {
      let mut p = Params::new();
      skill.sample_extra(&mut p, &mut rng_for_seed(seed)).unwrap();
      let (b1, b2, h) = (p.int("b1").unwrap(), p.int("b2").unwrap(), p.int("h").unwrap());
      assert!((4..=14).contains(&b1) && (6..=18).contains(&b2) && (3..=9).contains(&h));
      assert_eq!((b1 + b2) * h % 2, 0, "seed {seed}");
      assert!(["cm", "m"].contains(&p.text("units").unwrap()));
    }
  }

  #[test]
  fn trapezoid_honours_template_bounds() {
    let mut p = params(&[
      ("b1_min", ParamValue::Int(5)),
      ("b1_max", ParamValue::Int(5)),
      ("b2_min", ParamValue::Int(8)),
      ("b2_max", ParamValue::Int(8)),
      ("h_min", ParamValue::Int(3)),
      ("h_max", ParamValue::Int(3)),
    ]);
    TrapezoidArea.sample_extra(&mut p, &mut rng_for_seed(1)).unwrap();
    // odd sum with a fixed odd height cannot be nudged
    assert_eq!((p.int("b1").unwrap(), p.int("b2").unwrap(), p.int("h").unwrap()), (5, 8, 3));

    let mut bad = params(&[("h_min", ParamValue::Int(0))]);
    assert!(matches!(
      TrapezoidArea.sample_extra(&mut bad, &mut rng_for_seed(1)),
      Err(GenerationError::TemplateSchemaError(_))
    ));
  }

  #[test]
  fn unit_rate_scenario_is_coherent_or_kept() {
    let mut p = params(&[("x", ParamValue::Int(2)), ("y", ParamValue::Int(10))]);
    UnitRates.sample_extra(&mut p, &mut rng_for_seed(3)).unwrap();
    let units_x = p.text("units_x").unwrap().to_string();
    assert!(RATE_SCENARIOS.iter().any(|(_, x, plural)| *x == units_x && p.text("units_x_plural").unwrap() == *plural));

    let mut fixed = params(&[
      ("units_y", ParamValue::Text("laps".into())),
      ("units_x", ParamValue::Text("day".into())),
    ]);
    UnitRates.sample_extra(&mut fixed, &mut rng_for_seed(3)).unwrap();
    assert_eq!(fixed.text("units_y").unwrap(), "laps");
    assert_eq!(fixed.text("units_x_plural").unwrap(), "days");
  }

  #[test]
  fn prompts_render_parameters() {
    let t = Template {
      id: "t".into(),
      teks: "6.2".into(),
      kind: crate::domain::ItemType::Numeric,
      compute: crate::domain::ComputeRule::RationalOp,
      params: Default::default(),
      answer_format: Default::default(),
      difficulty: 1,
      presentation: Default::default(),
    };
    let p = params(&[
      ("a", ParamValue::Int(-3)),
      ("b", ParamValue::Int(-4)),
      ("op", ParamValue::Text("×".into())),
    ]);
    assert_eq!(RationalOps.build_prompt(&t, &p).unwrap(), "Compute -3 × (-4).");

    let p = params(&[
      ("form", ParamValue::Text("x / c = d".into())),
      ("c", ParamValue::Int(4)),
      ("d", ParamValue::Int(3)),
    ]);
    assert_eq!(OneStepEquations.build_prompt(&t, &p).unwrap(), "Solve for x: x/4 = 3.");
    assert_eq!(OneStepEquations.extra_hints(&p).unwrap(), vec!["Multiply both sides by 4."]);

    assert_eq!(GenericSkill.build_prompt(&t, &p).unwrap(), "Answer the question.");
  }

  #[test]
  fn classify_uses_equals_sign() {
    let answer = Answer::Choices(vec![]);
    assert!(ExpressionsVsEquations.classify_option("x + 3 = 7", &answer).0);
    assert!(!ExpressionsVsEquations.classify_option("4x - 2", &answer).0);
  }

  #[test]
  fn hints_start_with_a_variant_then_fixed_ones() {
    let p = params(&[("x", ParamValue::Int(3)), ("y", ParamValue::Int(-2))]);
    let hints = CoordinatePlane.build_hints(&p, &mut rng_for_seed(9)).unwrap();
    assert_eq!(hints.len(), 2);
    assert!(CoordinatePlane.hint_variants().contains(&hints[0].as_str()));
    assert_eq!(hints, CoordinatePlane.build_hints(&p, &mut rng_for_seed(9)).unwrap());
  }

  #[test]
  fn plane_grows_to_fit_point() {
    let p = params(&[("x", ParamValue::Int(7)), ("y", ParamValue::Int(-2))]);
    match CoordinatePlane.diagram(&p).unwrap() {
      Some(Shape::CoordinatePlane { x_min, x_max, y_min, y_max, .. }) => {
        assert_eq!((x_min, x_max, y_min, y_max), (-5, 7, -5, 5));
      }
      other => panic!("unexpected diagram {other:?}"),
    }
  }
}
