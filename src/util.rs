//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Unknown placeholders are left untouched.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Learner-facing number: at most two decimals, trailing zeros dropped.
/// `5.0` → `"5"`, `2.5` → `"2.5"`, `10.0 / 3.0` → `"3.33"`.
pub fn fmt_number(x: f64) -> String {
  if x.fract() == 0.0 && x.abs() < 1e15 {
    return format!("{}", x as i64);
  }
  let s = format!("{:.2}", x);
  let s = s.trim_end_matches('0').trim_end_matches('.');
  if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// True when `x` prints exactly through `fmt_number`.
pub fn is_short_decimal(x: f64) -> bool {
  ((x * 100.0).round() / 100.0 - x).abs() < 1e-12
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) {
    end -= 1;
  }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fills_known_placeholders_only() {
    let out = fill_template("{a} plus {b} is {c}", &[("a", "2"), ("b", "3")]);
    assert_eq!(out, "2 plus 3 is {c}");
  }

  #[test]
  fn formats_numbers_for_learners() {
    assert_eq!(fmt_number(5.0), "5");
    assert_eq!(fmt_number(-12.0), "-12");
    assert_eq!(fmt_number(2.5), "2.5");
    assert_eq!(fmt_number(10.0 / 3.0), "3.33");
    assert_eq!(fmt_number(-0.001), "0");
    assert!(is_short_decimal(2.25));
    assert!(!is_short_decimal(10.0 / 3.0));
  }

  #[test]
  fn truncates_on_char_boundary() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let out = trunc_for_log("×××××", 3);
    assert!(out.starts_with('×'));
    assert!(out.ends_with("(10 bytes total)"));
  }
}
