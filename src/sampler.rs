//! Stratified exam assembly: fixed-size question sets drawn from the bank
//! under a grid-in count and per-topic percentage bands.
//!
//! Flow:
//! 1) Dedupe the pool by id and split it by question type.
//! 2) Fix the grid-in picks first; their buckets count against the targets.
//! 3) Draw per-bucket targets inside the configured bands, rescale when the
//!    draws oversubscribe the set, then clamp to the slots the grid-ins left.
//!    Algebra is clamped first, then geometry, then statsprob; that fixed
//!    order is the tie-break deciding who loses slots under scarcity.
//! 4) Fill each bucket from its own shuffled sub-pool; shortfalls borrow
//!    from whatever is left across all sub-pools.
//! 5) Truncate to the target size and re-index 1..=len.
//!
//! The percentage bands are sampling targets, not guarantees: when a bucket
//! runs dry its slots flow into the unconstrained remainder so the set still
//! reaches full size. The only hard failure is a grid-in shortage in strict
//! mode.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::classify::bucket_of;
use crate::domain::{Bucket, Question, QuestionType};

/// Target mix for one composed set.
///
/// Percentage ranges are fractions of `total`; a target count is drawn
/// uniformly inside each range per composition, so consecutive sets vary.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MixConfig {
  pub total: usize,
  /// Exact number of grid-ins wanted in the set.
  pub grid_ins: usize,
  pub algebra_pct_range: (f64, f64),
  pub geometry_pct_range: (f64, f64),
  pub stats_pct_range: (f64, f64),
  /// Fail instead of degrading when the bank holds fewer grid-ins than requested.
  pub strict_grid_ins: bool,
}

impl Default for MixConfig {
  fn default() -> Self {
    Self {
      total: 57,
      grid_ins: 5,
      algebra_pct_range: (0.40, 0.45),
      geometry_pct_range: (0.30, 0.35),
      stats_pct_range: (0.15, 0.20),
      strict_grid_ins: false,
    }
  }
}

/// The one hard failure: strict mode demands more grid-ins than the bank holds.
/// Every other shortage degrades into a smaller or redistributed set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ComposeError {
  #[error("need {needed} grid-ins but only found {available}")]
  NotEnoughGridIns { needed: usize, available: usize },
}

/// Uniform random permutation of `items`, leaving the input untouched.
pub fn shuffled<T: Clone, R: Rng>(items: &[T], rng: &mut R) -> Vec<T> {
  let mut out = items.to_vec();
  out.shuffle(rng);
  out
}

/// Compose one exam set from `pool` under `cfg`, re-indexed 1..=len.
///
/// Returns at most `cfg.total` questions; fewer when the (deduplicated)
/// pool cannot fill the set. Inputs are never mutated.
pub fn compose_exam<R: Rng>(
  pool: &[Question],
  cfg: &MixConfig,
  rng: &mut R,
) -> Result<Vec<Question>, ComposeError> {
  // Deduplicate by id, first occurrence wins.
  let mut seen = HashSet::new();
  let bank: Vec<Question> = pool
    .iter()
    .filter(|q| !q.id.is_empty() && seen.insert(q.id.clone()))
    .cloned()
    .collect();

  // Pools by type.
  let (grid_pool, mc_pool): (Vec<Question>, Vec<Question>) = bank
    .into_iter()
    .partition(|q| q.question_type == QuestionType::GridIn);

  if grid_pool.len() < cfg.grid_ins && cfg.strict_grid_ins {
    return Err(ComposeError::NotEnoughGridIns {
      needed: cfg.grid_ins,
      available: grid_pool.len(),
    });
  }
  let grid_target = cfg.grid_ins.min(grid_pool.len());
  let slots_after_grids = cfg.total.saturating_sub(grid_target);

  // Draw bucket targets (random within the bands for variety across sets).
  let mut algebra_target = draw_target(cfg.algebra_pct_range, cfg.total, rng);
  let mut geometry_target = draw_target(cfg.geometry_pct_range, cfg.total, rng);
  let mut stats_target = draw_target(cfg.stats_pct_range, cfg.total, rng);

  // If the draws oversubscribe the set, scale them down proportionally and
  // hand the rounding leftovers out one by one: algebra, geometry, statsprob.
  let sum_targets = algebra_target + geometry_target + stats_target;
  if sum_targets > cfg.total {
    let scale = cfg.total as f64 / sum_targets as f64;
    algebra_target = (algebra_target as f64 * scale).floor() as usize;
    geometry_target = (geometry_target as f64 * scale).floor() as usize;
    stats_target = (stats_target as f64 * scale).floor() as usize;
    let mut leftover = cfg.total - (algebra_target + geometry_target + stats_target);
    let mut i = 0usize;
    while leftover > 0 {
      match i % 3 {
        0 => algebra_target += 1,
        1 => geometry_target += 1,
        _ => stats_target += 1,
      }
      leftover -= 1;
      i += 1;
    }
  }

  // Pick grid-ins first; the selection stays fixed from here on.
  let mut grid_picked = shuffled(&grid_pool, rng);
  grid_picked.truncate(grid_target);

  // Targets still open after counting the buckets the grid-ins already fill.
  let grid_count = |b: Bucket| grid_picked.iter().filter(|q| bucket_of(q) == b).count();
  let mut algebra_left = algebra_target.saturating_sub(grid_count(Bucket::Algebra));
  let mut geometry_left = geometry_target.saturating_sub(grid_count(Bucket::Geometry));
  let mut stats_left = stats_target.saturating_sub(grid_count(Bucket::StatsProb));

  // Never allocate more multiple-choice than there are slots left; algebra
  // has priority, then geometry, then statsprob, remainder unconstrained.
  let mut remaining_slots = slots_after_grids;
  algebra_left = algebra_left.min(remaining_slots);
  remaining_slots -= algebra_left;
  geometry_left = geometry_left.min(remaining_slots);
  remaining_slots -= geometry_left;
  stats_left = stats_left.min(remaining_slots);
  remaining_slots -= stats_left;
  let other_left = remaining_slots;

  // Shuffled multiple-choice sub-pools per bucket.
  let mut algebra_pool = bucket_subpool(&mc_pool, Bucket::Algebra, rng);
  let mut geometry_pool = bucket_subpool(&mc_pool, Bucket::Geometry, rng);
  let mut stats_pool = bucket_subpool(&mc_pool, Bucket::StatsProb, rng);
  let mut other_pool = bucket_subpool(&mc_pool, Bucket::Other, rng);

  let (algebra_items, algebra_short) = take_front(&mut algebra_pool, algebra_left);
  let (geometry_items, geometry_short) = take_front(&mut geometry_pool, geometry_left);
  let (stats_items, stats_short) = take_front(&mut stats_pool, stats_left);
  let (mut other_items, other_short) = take_front(&mut other_pool, other_left);

  // Borrow shortages from the leftover multiple-choice across all buckets.
  let shortage = algebra_short + geometry_short + stats_short + other_short;
  if shortage > 0 {
    let mut leftovers = algebra_pool;
    leftovers.extend(geometry_pool);
    leftovers.extend(stats_pool);
    leftovers.extend(other_pool);
    leftovers.truncate(shortage);
    other_items.extend(leftovers);
  }

  // Combine to final length and re-index.
  let mut combined = grid_picked;
  combined.extend(algebra_items);
  combined.extend(geometry_items);
  combined.extend(stats_items);
  combined.extend(other_items);
  combined.truncate(cfg.total);
  for (i, q) in combined.iter_mut().enumerate() {
    q.index = i + 1;
  }
  Ok(combined)
}

/// Round(fraction-in-range * total), clamped to [0, total].
fn draw_target<R: Rng>(range: (f64, f64), total: usize, rng: &mut R) -> usize {
  let (lo, hi) = range;
  let frac = if hi > lo { rng.gen_range(lo..hi) } else { lo };
  (frac * total as f64).round().clamp(0.0, total as f64) as usize
}

fn bucket_subpool<R: Rng>(mc_pool: &[Question], bucket: Bucket, rng: &mut R) -> Vec<Question> {
  let subset: Vec<Question> = mc_pool
    .iter()
    .filter(|q| bucket_of(q) == bucket)
    .cloned()
    .collect();
  shuffled(&subset, rng)
}

/// Pop up to `n` items off the front; second value is the shortfall.
fn take_front(pool: &mut Vec<Question>, n: usize) -> (Vec<Question>, usize) {
  let k = n.min(pool.len());
  let items: Vec<Question> = pool.drain(..k).collect();
  (items, n - k)
}
