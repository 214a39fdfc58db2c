//! Maps free-text bank categories into coarse topic buckets.
//!
//! Bank categories are curated strings ("Ratios", "Volume", "MMMR", ...) but
//! not a closed set, so we classify by case-insensitive substring matching
//! against ordered keyword tables. First table that matches wins: algebra is
//! checked before geometry, geometry before statsprob. The tables are the
//! behavior; changing a keyword changes which bucket existing bank content
//! lands in.

use crate::domain::{Bucket, Question};

// Algebra / proportional reasoning
const ALGEBRA_KEYWORDS: &[&str] = &[
  "algebra",
  "ratio",
  "ratios",
  "rate",
  "rates",
  "percent",
  "percents",
  "proportion",
  "proportional",
  "order of operations",
  "simplifying",
  "expressions",
  "equations",
  "inequalities",
  "number line",
  "absolute value",
];

// Geometry (incl. volume/surface area)
const GEOMETRY_KEYWORDS: &[&str] = &["geometry", "volume", "surface"];

// Statistics / probability / combinatorics
const STATSPROB_KEYWORDS: &[&str] = &[
  "statistics",
  "mmmr",
  "probability",
  "combination",
  "combinations",
];

/// Bucket for a question's category. Total: every question lands in exactly
/// one bucket, unknown or empty categories in `Other`.
pub fn bucket_of(q: &Question) -> Bucket {
  let c = q.category.to_lowercase();
  if contains_any(&c, ALGEBRA_KEYWORDS) {
    Bucket::Algebra
  } else if contains_any(&c, GEOMETRY_KEYWORDS) {
    Bucket::Geometry
  } else if contains_any(&c, STATSPROB_KEYWORDS) {
    Bucket::StatsProb
  } else {
    Bucket::Other
  }
}

fn contains_any(category: &str, keywords: &[&str]) -> bool {
  keywords.iter().any(|k| category.contains(k))
}
