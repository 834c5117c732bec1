//! Exact rational numbers.
//!
//! Used wherever an answer must stay exact end-to-end (one-step equations,
//! fraction-form grading, expression coefficients). Values are always kept
//! reduced with a positive denominator, so structural equality is numeric
//! equality.

use std::{cmp::Ordering, fmt, ops::Neg, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fraction {
  num: i128,
  den: i128,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseFractionError {
  #[error("empty input")]
  Empty,
  #[error("not a number: {0:?}")]
  Invalid(String),
  #[error("zero denominator")]
  ZeroDenominator,
  #[error("number out of range")]
  Overflow,
}

fn gcd(a: i128, b: i128) -> i128 {
  let (mut a, mut b) = (a.abs(), b.abs());
  while b != 0 {
    let t = a % b;
    a = b;
    b = t;
  }
  a
}

impl Fraction {
  pub const ZERO: Fraction = Fraction { num: 0, den: 1 };
  pub const ONE: Fraction = Fraction { num: 1, den: 1 };

  /// Build a reduced fraction. `None` for a zero denominator or values at the
  /// edge of the `i128` range.
  pub fn new(num: i128, den: i128) -> Option<Self> {
    if den == 0 || num == i128::MIN || den == i128::MIN {
      return None;
    }
    let g = gcd(num, den);
    let (mut num, mut den) = (num / g, den / g);
    if den < 0 {
      num = -num;
      den = -den;
    }
    Some(Self { num, den })
  }

  pub fn from_integer(n: i64) -> Self {
    Self { num: n as i128, den: 1 }
  }

  /// Exact value of the shortest decimal text of `v`.
  pub fn from_f64(v: f64) -> Option<Self> {
    if !v.is_finite() {
      return None;
    }
    v.to_string().parse().ok()
  }

  pub fn numer(&self) -> i128 { self.num }
  pub fn denom(&self) -> i128 { self.den }

  pub fn is_zero(&self) -> bool { self.num == 0 }
  pub fn is_integer(&self) -> bool { self.den == 1 }

  pub fn to_integer(&self) -> Option<i64> {
    if self.den == 1 { i64::try_from(self.num).ok() } else { None }
  }

  pub fn to_f64(&self) -> f64 {
    self.num as f64 / self.den as f64
  }

  pub fn abs(self) -> Self {
    Self { num: self.num.abs(), den: self.den }
  }

  pub fn checked_add(self, rhs: Self) -> Option<Self> {
    let num = self
      .num
      .checked_mul(rhs.den)?
      .checked_add(rhs.num.checked_mul(self.den)?)?;
    Self::new(num, self.den.checked_mul(rhs.den)?)
  }

  pub fn checked_sub(self, rhs: Self) -> Option<Self> {
    self.checked_add(-rhs)
  }

  pub fn checked_mul(self, rhs: Self) -> Option<Self> {
    Self::new(self.num.checked_mul(rhs.num)?, self.den.checked_mul(rhs.den)?)
  }

  /// `None` on overflow or when `rhs` is zero.
  pub fn checked_div(self, rhs: Self) -> Option<Self> {
    if rhs.is_zero() {
      return None;
    }
    Self::new(self.num.checked_mul(rhs.den)?, self.den.checked_mul(rhs.num)?)
  }

  pub fn checked_pow(self, exp: i32) -> Option<Self> {
    let base = if exp < 0 { Self::ONE.checked_div(self)? } else { self };
    let mut out = Self::ONE;
    for _ in 0..exp.unsigned_abs() {
      out = out.checked_mul(base)?;
    }
    Some(out)
  }

  pub fn checked_cmp(&self, other: &Self) -> Option<Ordering> {
    let lhs = self.num.checked_mul(other.den)?;
    let rhs = other.num.checked_mul(self.den)?;
    Some(lhs.cmp(&rhs))
  }

  /// Terminating decimal text (`7/2` → `"3.5"`), or `None` for repeating ones.
  pub fn to_decimal_string(&self) -> Option<String> {
    if self.den == 1 {
      return Some(self.num.to_string());
    }
    let (mut rest, mut twos, mut fives) = (self.den, 0u32, 0u32);
    while rest % 2 == 0 {
      rest /= 2;
      twos += 1;
    }
    while rest % 5 == 0 {
      rest /= 5;
      fives += 1;
    }
    if rest != 1 {
      return None;
    }
    let places = twos.max(fives);
    let scale = 10i128.checked_pow(places)?;
    let scaled = self.num.checked_mul(scale / self.den)?;
    let places = places as usize;
    let padded = format!("{:0>width$}", scaled.unsigned_abs(), width = places + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - places);
    let sign = if scaled < 0 { "-" } else { "" };
    Some(format!("{sign}{int_part}.{frac_part}"))
  }
}

impl Neg for Fraction {
  type Output = Fraction;
  fn neg(self) -> Fraction {
    Fraction { num: -self.num, den: self.den }
  }
}

impl From<i64> for Fraction {
  fn from(n: i64) -> Self { Fraction::from_integer(n) }
}

impl fmt::Display for Fraction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.den == 1 {
      write!(f, "{}", self.num)
    } else {
      write!(f, "{}/{}", self.num, self.den)
    }
  }
}

/// Accepts integers (`"-7"`), decimals (`"2.25"`, `".5"`) and quotients of
/// those (`"7/2"`, `"1.5 / 3"`).
impl FromStr for Fraction {
  type Err = ParseFractionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    // typographic minus (U+2212) reads as '-'
    let normalized = s.trim().replace('\u{2212}', "-");
    let s = normalized.as_str();
    if s.is_empty() {
      return Err(ParseFractionError::Empty);
    }
    match s.split_once('/') {
      Some((n, d)) => {
        let n = parse_decimal(n.trim())?;
        let d = parse_decimal(d.trim())?;
        if d.is_zero() {
          return Err(ParseFractionError::ZeroDenominator);
        }
        n.checked_div(d).ok_or(ParseFractionError::Overflow)
      }
      None => parse_decimal(s),
    }
  }
}

fn parse_decimal(s: &str) -> Result<Fraction, ParseFractionError> {
  let invalid = || ParseFractionError::Invalid(s.to_string());
  let (negative, body) = match s.strip_prefix('-') {
    Some(rest) => (true, rest),
    None => (false, s.strip_prefix('+').unwrap_or(s)),
  };
  let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
  if int_part.is_empty() && frac_part.is_empty() {
    return Err(invalid());
  }
  let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
  if !all_digits(int_part) || !all_digits(frac_part) {
    return Err(invalid());
  }
  let magnitude: i128 = format!("{int_part}{frac_part}")
    .parse()
    .map_err(|_| ParseFractionError::Overflow)?;
  let den = 10i128
    .checked_pow(frac_part.len() as u32)
    .ok_or(ParseFractionError::Overflow)?;
  let num = if negative { -magnitude } else { magnitude };
  Fraction::new(num, den).ok_or(ParseFractionError::Overflow)
}

impl Serialize for Fraction {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for Fraction {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn frac(s: &str) -> Fraction {
    s.parse().unwrap()
  }

  #[test]
  fn reduces_and_normalizes_sign() {
    let f = Fraction::new(6, -8).unwrap();
    assert_eq!(f.numer(), -3);
    assert_eq!(f.denom(), 4);
    assert_eq!(f.to_string(), "-3/4");
    assert!(Fraction::new(1, 0).is_none());
  }

  #[test]
  fn parses_integers_decimals_and_quotients() {
    assert_eq!(frac("7"), Fraction::from_integer(7));
    assert_eq!(frac(" -2.5 "), Fraction::new(-5, 2).unwrap());
    assert_eq!(frac(".5"), Fraction::new(1, 2).unwrap());
    assert_eq!(frac("-7/2"), Fraction::new(-7, 2).unwrap());
    assert_eq!(frac("1.5 / 3"), Fraction::new(1, 2).unwrap());
    assert_eq!(frac("10/5").to_string(), "2");
  }

  #[test]
  fn accepts_typographic_minus() {
    assert_eq!(frac("\u{2212}3"), Fraction::from_integer(-3));
    assert_eq!(frac("\u{2212}7/2"), Fraction::new(-7, 2).unwrap());
    assert_eq!(frac("3/\u{2212}4"), Fraction::new(-3, 4).unwrap());
  }

  #[test]
  fn rejects_garbage() {
    assert_eq!("".parse::<Fraction>(), Err(ParseFractionError::Empty));
    assert!("abc".parse::<Fraction>().is_err());
    assert!("1.2.3".parse::<Fraction>().is_err());
    assert!("-".parse::<Fraction>().is_err());
    assert!("nan".parse::<Fraction>().is_err());
    assert_eq!("3/0".parse::<Fraction>(), Err(ParseFractionError::ZeroDenominator));
  }

  #[test]
  fn arithmetic_is_exact() {
    let third = Fraction::new(1, 3).unwrap();
    let sum = third.checked_add(third).unwrap().checked_add(third).unwrap();
    assert_eq!(sum, Fraction::ONE);
    assert_eq!(frac("3/4").checked_mul(frac("2/3")).unwrap(), frac("1/2"));
    assert_eq!(frac("1/2").checked_sub(frac("3/4")).unwrap(), frac("-1/4"));
    assert!(frac("1").checked_div(Fraction::ZERO).is_none());
    assert_eq!(frac("2/3").checked_pow(-2).unwrap(), frac("9/4"));
  }

  #[test]
  fn decimal_text_only_for_terminating_values() {
    assert_eq!(frac("7/2").to_decimal_string().as_deref(), Some("3.5"));
    assert_eq!(frac("-1/4").to_decimal_string().as_deref(), Some("-0.25"));
    assert_eq!(frac("3/40").to_decimal_string().as_deref(), Some("0.075"));
    assert_eq!(frac("12").to_decimal_string().as_deref(), Some("12"));
    assert_eq!(frac("1/3").to_decimal_string(), None);
  }

  #[test]
  fn from_f64_uses_shortest_decimal() {
    assert_eq!(Fraction::from_f64(0.1).unwrap(), frac("1/10"));
    assert_eq!(Fraction::from_f64(-2.5).unwrap(), frac("-5/2"));
    assert!(Fraction::from_f64(f64::NAN).is_none());
  }

  #[test]
  fn serializes_as_text() {
    let json = serde_json::to_string(&frac("-7/2")).unwrap();
    assert_eq!(json, "\"-7/2\"");
    let back: Fraction = serde_json::from_str(&json).unwrap();
    assert_eq!(back, frac("-7/2"));
  }
}
