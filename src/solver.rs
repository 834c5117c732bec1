//! Answer engine: pure rules computing the canonical answer of a template from
//! sampled parameters, together with the arithmetic trace used by explanations.
//!
//! Numeric representation per answer form:
//! - `int`      → exact `i64` (trapezoid area),
//! - `fraction` → exact `Fraction` (one-step equations; rational ops and unit
//!   rates when a template asks for fraction form),
//! - `decimal`  → `f64` (unit rate, rational ops).

use std::{fmt, str::FromStr};

use crate::domain::{Answer, AnswerForm, ComputeRule, Params, Point, Template};
use crate::error::GenerationError;
use crate::fraction::Fraction;
use crate::util::{fmt_number, is_short_decimal};

pub use crate::expr::equivalent as equiv_expr;

/// Side information produced next to the answer.
#[derive(Clone, Debug, PartialEq)]
pub struct ComputeMeta {
  pub rule: ComputeRule,
  /// Ordered arithmetic trace, one learner-facing sentence per step.
  pub steps: Vec<String>,
}

/// Dispatch on the template's rule.
pub fn compute(template: &Template, params: &Params) -> Result<(Answer, ComputeMeta), GenerationError> {
  let form = template.answer_format.form;
  let (answer, steps) = match template.compute {
    ComputeRule::TrapezoidArea => trapezoid(params)?,
    ComputeRule::UnitRate => rate(params, form)?,
    ComputeRule::OneStepEquation => one_step(params, form)?,
    ComputeRule::RationalOp => rational_op(params, form)?,
    ComputeRule::ClassifyEquations => classify(params)?,
    ComputeRule::Distribute => distribute(params)?,
    ComputeRule::PlotPoint => plot_point(params)?,
  };
  Ok((answer, ComputeMeta { rule: template.compute, steps }))
}

// ---------------- Trapezoid area ----------------

/// `((b1 + b2) * h) / 2` in integer arithmetic. All dimensions must be positive.
pub fn area_trapezoid(b1: i64, b2: i64, h: i64) -> Result<i64, GenerationError> {
  if b1 <= 0 || b2 <= 0 || h <= 0 {
    return Err(GenerationError::InvalidGeometry(format!(
      "trapezoid needs positive bases and height, got b1={b1}, b2={b2}, h={h}"
    )));
  }
  let doubled = b1
    .checked_add(b2)
    .and_then(|s| s.checked_mul(h))
    .ok_or_else(|| GenerationError::Overflow("trapezoid area".into()))?;
  Ok(doubled / 2)
}

fn trapezoid(params: &Params) -> Result<(Answer, Vec<String>), GenerationError> {
  let (b1, b2, h) = (params.int("b1")?, params.int("b2")?, params.int("h")?);
  let area = area_trapezoid(b1, b2, h)?;
  let sum = b1 + b2;
  let steps = vec![
    format!("Add the bases: {b1} + {b2} = {sum}."),
    format!("Multiply by the height: {sum} × {h} = {}.", sum * h),
    format!("Divide by 2: {} ÷ 2 = {area}.", sum * h),
  ];
  Ok((Answer::Integer(area), steps))
}

// ---------------- Unit rate ----------------

/// `y / x` as a real number.
pub fn unit_rate(x: f64, y: f64) -> Result<f64, GenerationError> {
  if x == 0.0 {
    return Err(GenerationError::DivisionByZero("unit rate with x = 0".into()));
  }
  Ok(y / x)
}

fn rate(params: &Params, form: AnswerForm) -> Result<(Answer, Vec<String>), GenerationError> {
  let (x, y) = (params.fraction("x")?, params.fraction("y")?);
  let answer = match form {
    AnswerForm::Decimal => Answer::Decimal(unit_rate(x.to_f64(), y.to_f64())?),
    _ => {
      if x.is_zero() {
        return Err(GenerationError::DivisionByZero("unit rate with x = 0".into()));
      }
      exact_answer(y.checked_div(x).ok_or_else(|| GenerationError::Overflow("unit rate".into()))?, form)
    }
  };
  let steps = vec![format!(
    "Divide the total by the number of units: {y} ÷ {x} {}.",
    equals_text(&answer)
  )];
  Ok((answer, steps))
}

// ---------------- One-step equations ----------------

/// The four canonical one-step equation shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EquationForm {
  /// `x + a = b`
  AddConst,
  /// `x - a = b`
  SubConst,
  /// `c x = d`
  Scale,
  /// `x / c = d`
  Divide,
}

impl EquationForm {
  /// Parameter names holding the two constants, in equation order.
  pub fn operand_names(&self) -> (&'static str, &'static str) {
    match self {
      EquationForm::AddConst | EquationForm::SubConst => ("a", "b"),
      EquationForm::Scale | EquationForm::Divide => ("c", "d"),
    }
  }

  /// Learner-facing equation, e.g. `3x = 15`.
  pub fn render(&self, p: &str, q: &str) -> String {
    let wrap = |s: &str| if s.starts_with('-') { format!("({s})") } else { s.to_string() };
    match self {
      EquationForm::AddConst => format!("x + {} = {q}", wrap(p)),
      EquationForm::SubConst => format!("x - {} = {q}", wrap(p)),
      EquationForm::Scale => format!("{}x = {q}", wrap(p)),
      EquationForm::Divide => format!("x/{} = {q}", wrap(p)),
    }
  }
}

impl FromStr for EquationForm {
  type Err = GenerationError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.as_str() {
      "x+a=b" => Ok(EquationForm::AddConst),
      "x-a=b" => Ok(EquationForm::SubConst),
      "cx=d" | "c*x=d" => Ok(EquationForm::Scale),
      "x/c=d" => Ok(EquationForm::Divide),
      _ => Err(GenerationError::InvalidParam {
        name: "form".into(),
        reason: format!("unsupported equation form {s:?}"),
      }),
    }
  }
}

/// Solve for `x` exactly. `p`/`q` are `(a, b)` or `(c, d)` depending on the form.
pub fn solve_one_step(form: EquationForm, p: Fraction, q: Fraction) -> Result<Fraction, GenerationError> {
  let overflow = || GenerationError::Overflow("one-step equation".into());
  match form {
    EquationForm::AddConst => q.checked_sub(p).ok_or_else(overflow),
    EquationForm::SubConst => q.checked_add(p).ok_or_else(overflow),
    EquationForm::Scale => {
      if p.is_zero() {
        return Err(GenerationError::DivisionByZero("c x = d with c = 0".into()));
      }
      q.checked_div(p).ok_or_else(overflow)
    }
    EquationForm::Divide => {
      if p.is_zero() {
        return Err(GenerationError::DivisionByZero("x / c = d with c = 0".into()));
      }
      q.checked_mul(p).ok_or_else(overflow)
    }
  }
}

fn one_step(params: &Params, form: AnswerForm) -> Result<(Answer, Vec<String>), GenerationError> {
  let eq: EquationForm = params.text("form")?.parse()?;
  let (pn, qn) = eq.operand_names();
  let (p, q) = (params.fraction(pn)?, params.fraction(qn)?);
  let x = solve_one_step(eq, p, q)?;
  let first = match eq {
    EquationForm::AddConst => format!("Subtract {p} from both sides: x = {q} - {p}."),
    EquationForm::SubConst => format!("Add {p} to both sides: x = {q} + {p}."),
    EquationForm::Scale => format!("Divide both sides by {p}: x = {q} ÷ {p}."),
    EquationForm::Divide => format!("Multiply both sides by {p}: x = {q} × {p}."),
  };
  let answer = exact_answer(x, form);
  let steps = vec![first, format!("So x {}.", equals_text(&answer))];
  Ok((answer, steps))
}

// ---------------- Rational operations ----------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
  Add,
  Sub,
  Mul,
  Div,
}

impl FromStr for Op {
  type Err = GenerationError;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "+" => Ok(Op::Add),
      "-" | "−" => Ok(Op::Sub),
      "×" | "*" => Ok(Op::Mul),
      "÷" | "/" => Ok(Op::Div),
      other => Err(GenerationError::InvalidParam {
        name: "op".into(),
        reason: format!("unsupported operator {other:?}"),
      }),
    }
  }
}

impl fmt::Display for Op {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Op::Add => "+",
      Op::Sub => "-",
      Op::Mul => "×",
      Op::Div => "÷",
    })
  }
}

pub fn op_apply(a: f64, b: f64, op: Op) -> Result<f64, GenerationError> {
  match op {
    Op::Add => Ok(a + b),
    Op::Sub => Ok(a - b),
    Op::Mul => Ok(a * b),
    Op::Div if b == 0.0 => Err(GenerationError::DivisionByZero(format!("{} ÷ 0", fmt_number(a)))),
    Op::Div => Ok(a / b),
  }
}

pub fn op_apply_exact(a: Fraction, b: Fraction, op: Op) -> Result<Fraction, GenerationError> {
  if op == Op::Div && b.is_zero() {
    return Err(GenerationError::DivisionByZero(format!("{a} ÷ 0")));
  }
  let out = match op {
    Op::Add => a.checked_add(b),
    Op::Sub => a.checked_sub(b),
    Op::Mul => a.checked_mul(b),
    Op::Div => a.checked_div(b),
  };
  out.ok_or_else(|| GenerationError::Overflow(format!("{a} {op} {b}")))
}

fn rational_op(params: &Params, form: AnswerForm) -> Result<(Answer, Vec<String>), GenerationError> {
  let op: Op = params.text("op")?.parse()?;
  let (a, b) = (params.fraction("a")?, params.fraction("b")?);
  let answer = match form {
    AnswerForm::Decimal => Answer::Decimal(op_apply(a.to_f64(), b.to_f64(), op)?),
    _ => exact_answer(op_apply_exact(a, b, op)?, form),
  };
  let b_text = if b.numer() < 0 { format!("({b})") } else { b.to_string() };
  let steps = vec![format!("Compute {a} {op} {b_text} {}.", equals_text(&answer))];
  Ok((answer, steps))
}

// ---------------- Expressions vs equations ----------------

/// An equation states that two sides are equal.
pub fn is_equation(form: &str) -> bool {
  form.contains('=')
}

fn classify(params: &Params) -> Result<(Answer, Vec<String>), GenerationError> {
  let forms: Vec<String> = params.list("forms")?.iter().map(|v| v.to_string()).collect();
  let mut steps = Vec::with_capacity(forms.len());
  for f in &forms {
    if is_equation(f) {
      steps.push(format!("\"{f}\" is an equation because it has an equals sign."));
    } else {
      steps.push(format!("\"{f}\" is an expression because it has no equals sign."));
    }
  }
  let correct = forms.into_iter().filter(|f| is_equation(f)).collect();
  Ok((Answer::Choices(correct), steps))
}

// ---------------- Distributive property ----------------

fn distribute(params: &Params) -> Result<(Answer, Vec<String>), GenerationError> {
  let (a, b) = (params.int("a")?, params.int("b")?);
  let ab = a.checked_mul(b).ok_or_else(|| GenerationError::Overflow("distribute".into()))?;
  let expanded = if ab < 0 { format!("{a}x - {}", -ab) } else { format!("{a}x + {ab}") };
  let inner = if b < 0 { format!("x - {}", -b) } else { format!("x + {b}") };
  let steps = vec![
    format!("Multiply {a} by x: {a}x."),
    format!("Multiply {a} by {b}: {ab}."),
    format!("So {a}({inner}) = {expanded}."),
  ];
  Ok((Answer::Expression(expanded), steps))
}

// ---------------- Plotting ----------------

fn plot_point(params: &Params) -> Result<(Answer, Vec<String>), GenerationError> {
  let (x, y) = (params.number("x")?, params.number("y")?);
  let horizontal = match x {
    v if v > 0.0 => format!("Move {} units right.", fmt_number(v)),
    v if v < 0.0 => format!("Move {} units left.", fmt_number(-v)),
    _ => "Do not move left or right.".to_string(),
  };
  let vertical = match y {
    v if v > 0.0 => format!("Move {} units up.", fmt_number(v)),
    v if v < 0.0 => format!("Move {} units down.", fmt_number(-v)),
    _ => "Do not move up or down.".to_string(),
  };
  let steps = vec!["Start at the origin (0, 0).".to_string(), horizontal, vertical];
  Ok((Answer::Point(Point { x, y }), steps))
}

// ---------------- helpers ----------------

fn exact_answer(value: Fraction, form: AnswerForm) -> Answer {
  match form {
    AnswerForm::Int => value.to_integer().map(Answer::Integer).unwrap_or(Answer::Fraction(value)),
    AnswerForm::Fraction => Answer::Fraction(value),
    AnswerForm::Decimal => Answer::Decimal(value.to_f64()),
  }
}

/// `"= 5"` or `"≈ 3.33"`.
fn equals_text(answer: &Answer) -> String {
  match answer {
    Answer::Decimal(x) if !is_short_decimal(*x) => format!("≈ {}", fmt_number(*x)),
    other => format!("= {other}"),
  }
}
