//! Answer grading helpers.
//!
//! Grid-in entries are free text, so "3/10", " 0.3" and "0.30" must all
//! count as the same answer: parse both sides to a number and compare with
//! a small epsilon. Multiple-choice answers are option keys and compare as
//! case-insensitive strings.

/// Parse a grid-in entry: an integer fraction ("3/10", "-3/10") or a plain
/// decimal ("-4", "0.3"). Whitespace is ignored; anything else is `None`.
pub fn parse_numeric(value: &str) -> Option<f64> {
  let v: String = value.chars().filter(|c| !c.is_whitespace()).collect();
  if v.is_empty() {
    return None;
  }
  if let Some((numer, denom)) = v.split_once('/') {
    let n: i64 = numer.parse().ok()?;
    let d: i64 = denom.parse().ok()?;
    if d == 0 {
      return None;
    }
    return Some(n as f64 / d as f64);
  }
  let num: f64 = v.parse().ok()?;
  num.is_finite().then_some(num)
}

/// True when both sides parse and agree numerically.
pub fn grid_answer_correct(input: &str, answer: &str) -> bool {
  match (parse_numeric(input), parse_numeric(answer)) {
    (Some(a), Some(b)) => (a - b).abs() < 1e-9,
    _ => false,
  }
}

/// Multiple-choice match on option keys, ignoring case and surrounding space.
pub fn choice_answer_correct(input: &str, answer: &str) -> bool {
  let given = input.trim();
  !given.is_empty() && given.eq_ignore_ascii_case(answer.trim())
}
