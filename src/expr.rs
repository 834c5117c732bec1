//! Symbolic equivalence for short algebraic expressions.
//!
//! Both sides are parsed into rational functions with exact coefficients and
//! compared by cross-multiplication, so `3(x + 4)` matches `3x + 12` and
//! `x/2` matches `0.5x`. Variables are single letters; `ab` reads as `a*b`.

use std::collections::BTreeMap;

use crate::fraction::Fraction;

/// Longest accepted input, in characters.
pub const MAX_INPUT_CHARS: usize = 256;
const MAX_EXPONENT: i64 = 16;
const MAX_TERMS: usize = 512;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExprError {
  #[error("empty expression")]
  Empty,
  #[error("expression too long")]
  TooLong,
  #[error("unexpected character {0:?}")]
  BadChar(char),
  #[error("unexpected {0}")]
  Unexpected(String),
  #[error("unexpected end of expression")]
  UnexpectedEnd,
  #[error("exponents must be small whole numbers")]
  BadExponent,
  #[error("division by zero")]
  DivisionByZero,
  #[error("expression too large")]
  TooLarge,
}

/// True when both inputs parse and agree as rational functions. Malformed
/// input on either side is never equivalent.
pub fn equivalent(lhs: &str, rhs: &str) -> bool {
  match (parse(lhs), parse(rhs)) {
    (Ok(a), Ok(b)) => a.same_as(&b).unwrap_or(false),
    _ => false,
  }
}

/// Parse into a normalized rational function.
pub fn parse(input: &str) -> Result<Rational, ExprError> {
  if input.chars().count() > MAX_INPUT_CHARS {
    return Err(ExprError::TooLong);
  }
  let tokens = tokenize(input)?;
  if tokens.is_empty() {
    return Err(ExprError::Empty);
  }
  let mut parser = Parser { tokens, pos: 0 };
  let value = parser.expr()?;
  match parser.peek() {
    None => Ok(value),
    Some(tok) => Err(ExprError::Unexpected(tok.describe())),
  }
}

// ---------------- tokens ----------------

#[derive(Clone, Debug, PartialEq)]
enum Token {
  Num(Fraction),
  Var(char),
  Plus,
  Minus,
  Star,
  Slash,
  Caret,
  LParen,
  RParen,
}

impl Token {
  fn describe(&self) -> String {
    match self {
      Token::Num(n) => format!("number {n}"),
      Token::Var(c) => format!("variable {c}"),
      Token::Plus => "'+'".into(),
      Token::Minus => "'-'".into(),
      Token::Star => "'*'".into(),
      Token::Slash => "'/'".into(),
      Token::Caret => "'^'".into(),
      Token::LParen => "'('".into(),
      Token::RParen => "')'".into(),
    }
  }

  /// Tokens that may start a factor directly after another factor.
  fn starts_implicit_factor(&self) -> bool {
    matches!(self, Token::Num(_) | Token::Var(_) | Token::LParen)
  }
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
  let chars: Vec<char> = input.chars().collect();
  let mut out = Vec::new();
  let mut i = 0;
  while i < chars.len() {
    let c = chars[i];
    match c {
      c if c.is_whitespace() => {}
      '0'..='9' | '.' => {
        let start = i;
        while i + 1 < chars.len() && (chars[i + 1].is_ascii_digit() || chars[i + 1] == '.') {
          i += 1;
        }
        let text: String = chars[start..=i].iter().collect();
        let n = text.parse::<Fraction>().map_err(|_| ExprError::Unexpected(format!("number {text:?}")))?;
        out.push(Token::Num(n));
      }
      c if c.is_ascii_alphabetic() => out.push(Token::Var(c)),
      '+' => out.push(Token::Plus),
      '-' | '−' => out.push(Token::Minus),
      '*' if chars.get(i + 1) == Some(&'*') => {
        i += 1;
        out.push(Token::Caret);
      }
      '*' | '×' | '·' => out.push(Token::Star),
      '/' | '÷' => out.push(Token::Slash),
      '^' => out.push(Token::Caret),
      '(' | '[' => out.push(Token::LParen),
      ')' | ']' => out.push(Token::RParen),
      other => return Err(ExprError::BadChar(other)),
    }
    i += 1;
  }
  Ok(out)
}

// ---------------- parser ----------------

struct Parser {
  tokens: Vec<Token>,
  pos: usize,
}

impl Parser {
  fn peek(&self) -> Option<&Token> { self.tokens.get(self.pos) }

  fn next(&mut self) -> Option<Token> {
    let tok = self.tokens.get(self.pos).cloned();
    self.pos += 1;
    tok
  }

  // expr := term (('+' | '-') term)*
  fn expr(&mut self) -> Result<Rational, ExprError> {
    let mut acc = self.term()?;
    loop {
      match self.peek() {
        Some(Token::Plus) => {
          self.pos += 1;
          acc = acc.add(&self.term()?)?;
        }
        Some(Token::Minus) => {
          self.pos += 1;
          acc = acc.sub(&self.term()?)?;
        }
        _ => return Ok(acc),
      }
    }
  }

  // term := unary (('*' | '/' | <implicit>) unary)*
  fn term(&mut self) -> Result<Rational, ExprError> {
    let mut acc = self.unary()?;
    loop {
      match self.peek() {
        Some(Token::Star) => {
          self.pos += 1;
          acc = acc.mul(&self.unary()?)?;
        }
        Some(Token::Slash) => {
          self.pos += 1;
          acc = acc.div(&self.unary()?)?;
        }
        Some(tok) if tok.starts_implicit_factor() => {
          acc = acc.mul(&self.power()?)?;
        }
        _ => return Ok(acc),
      }
    }
  }

  // unary := ('-' | '+') unary | power
  fn unary(&mut self) -> Result<Rational, ExprError> {
    match self.peek() {
      Some(Token::Minus) => {
        self.pos += 1;
        Ok(self.unary()?.neg())
      }
      Some(Token::Plus) => {
        self.pos += 1;
        self.unary()
      }
      _ => self.power(),
    }
  }

  // power := atom ('^' unary)?
  fn power(&mut self) -> Result<Rational, ExprError> {
    let base = self.atom()?;
    if self.peek() != Some(&Token::Caret) {
      return Ok(base);
    }
    self.pos += 1;
    let exp = self.unary()?;
    let n = exp
      .constant()
      .and_then(|c| c.to_integer())
      .filter(|n| n.abs() <= MAX_EXPONENT)
      .ok_or(ExprError::BadExponent)?;
    base.pow(n)
  }

  fn atom(&mut self) -> Result<Rational, ExprError> {
    match self.next() {
      Some(Token::Num(n)) => Ok(Rational::constant_of(n)),
      Some(Token::Var(c)) => Ok(Rational::var(c)),
      Some(Token::LParen) => {
        let inner = self.expr()?;
        match self.next() {
          Some(Token::RParen) => Ok(inner),
          Some(tok) => Err(ExprError::Unexpected(tok.describe())),
          None => Err(ExprError::UnexpectedEnd),
        }
      }
      Some(tok) => Err(ExprError::Unexpected(tok.describe())),
      None => Err(ExprError::UnexpectedEnd),
    }
  }
}

// ---------------- polynomials ----------------

/// Product of variables with positive exponents, sorted by variable.
type Monomial = Vec<(char, u32)>;

#[derive(Clone, Debug, Default, PartialEq)]
struct Poly {
  terms: BTreeMap<Monomial, Fraction>,
}

impl Poly {
  fn constant(c: Fraction) -> Self {
    let mut terms = BTreeMap::new();
    if !c.is_zero() {
      terms.insert(Vec::new(), c);
    }
    Poly { terms }
  }

  fn var(c: char) -> Self {
    let mut terms = BTreeMap::new();
    terms.insert(vec![(c, 1)], Fraction::ONE);
    Poly { terms }
  }

  fn is_zero(&self) -> bool { self.terms.is_empty() }

  fn as_constant(&self) -> Option<Fraction> {
    match self.terms.len() {
      0 => Some(Fraction::ZERO),
      1 => self.terms.get(&Monomial::new()).copied(),
      _ => None,
    }
  }

  fn add_term(&mut self, mono: Monomial, coeff: Fraction) -> Result<(), ExprError> {
    let sum = match self.terms.get(&mono) {
      Some(existing) => existing.checked_add(coeff).ok_or(ExprError::TooLarge)?,
      None => coeff,
    };
    if sum.is_zero() {
      self.terms.remove(&mono);
    } else {
      self.terms.insert(mono, sum);
    }
    if self.terms.len() > MAX_TERMS {
      return Err(ExprError::TooLarge);
    }
    Ok(())
  }

  fn add(&self, other: &Poly) -> Result<Poly, ExprError> {
    let mut out = self.clone();
    for (mono, coeff) in &other.terms {
      out.add_term(mono.clone(), *coeff)?;
    }
    Ok(out)
  }

  fn neg(&self) -> Poly {
    Poly { terms: self.terms.iter().map(|(m, c)| (m.clone(), -*c)).collect() }
  }

  fn mul(&self, other: &Poly) -> Result<Poly, ExprError> {
    let mut out = Poly::default();
    for (ma, ca) in &self.terms {
      for (mb, cb) in &other.terms {
        let coeff = ca.checked_mul(*cb).ok_or(ExprError::TooLarge)?;
        out.add_term(merge(ma, mb), coeff)?;
      }
    }
    Ok(out)
  }

  fn scale(&self, k: Fraction) -> Result<Poly, ExprError> {
    self.mul(&Poly::constant(k))
  }
}

fn merge(a: &Monomial, b: &Monomial) -> Monomial {
  let mut powers: BTreeMap<char, u32> = a.iter().copied().collect();
  for (v, e) in b {
    *powers.entry(*v).or_insert(0) += e;
  }
  powers.into_iter().collect()
}

// ---------------- rational functions ----------------

/// `num / den` with a non-zero denominator. A constant denominator is always
/// folded into the numerator.
#[derive(Clone, Debug, PartialEq)]
pub struct Rational {
  num: Poly,
  den: Poly,
}

impl Rational {
  fn constant_of(c: Fraction) -> Self {
    Rational { num: Poly::constant(c), den: Poly::constant(Fraction::ONE) }
  }

  fn var(c: char) -> Self {
    Rational { num: Poly::var(c), den: Poly::constant(Fraction::ONE) }
  }

  fn build(num: Poly, den: Poly) -> Result<Self, ExprError> {
    match den.as_constant() {
      Some(k) if k.is_zero() => Err(ExprError::DivisionByZero),
      Some(k) => {
        let inv = Fraction::ONE.checked_div(k).ok_or(ExprError::TooLarge)?;
        Ok(Rational { num: num.scale(inv)?, den: Poly::constant(Fraction::ONE) })
      }
      None => Ok(Rational { num, den }),
    }
  }

  /// Value when the expression has no variables.
  pub fn constant(&self) -> Option<Fraction> {
    let n = self.num.as_constant()?;
    let d = self.den.as_constant()?;
    n.checked_div(d)
  }

  fn add(&self, other: &Rational) -> Result<Rational, ExprError> {
    let num = self.num.mul(&other.den)?.add(&other.num.mul(&self.den)?)?;
    let den = self.den.mul(&other.den)?;
    Rational::build(num, den)
  }

  fn sub(&self, other: &Rational) -> Result<Rational, ExprError> {
    self.add(&other.neg())
  }

  fn neg(&self) -> Rational {
    Rational { num: self.num.neg(), den: self.den.clone() }
  }

  fn mul(&self, other: &Rational) -> Result<Rational, ExprError> {
    Rational::build(self.num.mul(&other.num)?, self.den.mul(&other.den)?)
  }

  fn div(&self, other: &Rational) -> Result<Rational, ExprError> {
    if other.num.is_zero() {
      return Err(ExprError::DivisionByZero);
    }
    Rational::build(self.num.mul(&other.den)?, self.den.mul(&other.num)?)
  }

  fn pow(&self, n: i64) -> Result<Rational, ExprError> {
    let base = if n < 0 {
      Rational::constant_of(Fraction::ONE).div(self)?
    } else {
      self.clone()
    };
    let mut out = Rational::constant_of(Fraction::ONE);
    for _ in 0..n.unsigned_abs() {
      out = out.mul(&base)?;
    }
    Ok(out)
  }

  /// Polynomial identity `a.num * b.den == b.num * a.den`.
  fn same_as(&self, other: &Rational) -> Result<bool, ExprError> {
    let lhs = self.num.mul(&other.den)?;
    let rhs = other.num.mul(&self.den)?;
    Ok(lhs.add(&rhs.neg())?.is_zero())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn distributive_forms_match() {
    assert!(equivalent("3(x + 4)", "3x + 12"));
    assert!(equivalent("3x + 12", "12 + 3*x"));
    assert!(equivalent("x + 1", "1 + x"));
    assert!(equivalent("2(a + b)", "2a + 2b"));
    assert!(equivalent("(x + 1)(x - 1)", "x^2 - 1"));
    assert!(equivalent("x**2 + 2x + 1", "(x+1)^2"));
  }

  #[test]
  fn rational_coefficients_and_quotients() {
    assert!(equivalent("x/2", "0.5x"));
    assert!(equivalent("(x^2 - 1)/(x - 1)", "(x + 1)(x - 1)/(x - 1)"));
    assert!(equivalent("1/x + 1/x", "2/x"));
    assert!(equivalent("6 ÷ 3 × x", "2x"));
    assert!(equivalent("x^-1", "1/x"));
  }

  #[test]
  fn different_expressions_do_not_match() {
    assert!(!equivalent("3x + 12", "3x + 4"));
    assert!(!equivalent("x", "y"));
    assert!(!equivalent("x^2", "2x"));
    assert!(!equivalent("-x^2", "(-x)^2"));
  }

  #[test]
  fn malformed_input_is_never_equivalent() {
    assert!(!equivalent("3(x + 4", "3x + 12"));
    assert!(!equivalent("3x +", "3x"));
    assert!(!equivalent("", ""));
    assert!(!equivalent("x $ 2", "x $ 2"));
    assert!(!equivalent("x^y", "x^y"));
    assert!(!equivalent("1/0", "1/0"));
    assert!(!equivalent("x/(x - x)", "1"));
    assert!(!equivalent("x^99", "x^99"));
    let long = "x+".repeat(200) + "x";
    assert_eq!(parse(&long), Err(ExprError::TooLong));
  }

  #[test]
  fn equivalence_is_symmetric() {
    let pairs = [("3(x + 4)", "3x + 12"), ("x/2", "x"), ("a b", "ba"), ("2(x-3)", "2x - 5")];
    for (a, b) in pairs {
      assert_eq!(equivalent(a, b), equivalent(b, a), "{a} vs {b}");
    }
  }

  #[test]
  fn constants_fold() {
    assert_eq!(parse("2^3 - 1").unwrap().constant(), Some(Fraction::from_integer(7)));
    assert_eq!(parse("x - x").unwrap().constant(), Some(Fraction::ZERO));
    assert_eq!(parse("x").unwrap().constant(), None);
  }
}
