//! Public request/response structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Bucket, Question};
use crate::sampler::MixConfig;

/// Mix parameters accepted both as query string (compose) and JSON body
/// (start). Absent fields fall back to the server's mix defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MixOverrides {
    pub total: Option<usize>,
    pub grid_ins: Option<usize>,
    pub algebra_min: Option<f64>,
    pub algebra_max: Option<f64>,
    pub geometry_min: Option<f64>,
    pub geometry_max: Option<f64>,
    pub stats_min: Option<f64>,
    pub stats_max: Option<f64>,
    pub strict_grid_ins: Option<bool>,
}

impl MixOverrides {
    /// Resolve onto the server defaults, field by field.
    pub fn resolve(&self, defaults: &MixConfig) -> MixConfig {
        MixConfig {
            total: self.total.unwrap_or(defaults.total),
            grid_ins: self.grid_ins.unwrap_or(defaults.grid_ins),
            algebra_pct_range: (
                self.algebra_min.unwrap_or(defaults.algebra_pct_range.0),
                self.algebra_max.unwrap_or(defaults.algebra_pct_range.1),
            ),
            geometry_pct_range: (
                self.geometry_min.unwrap_or(defaults.geometry_pct_range.0),
                self.geometry_max.unwrap_or(defaults.geometry_pct_range.1),
            ),
            stats_pct_range: (
                self.stats_min.unwrap_or(defaults.stats_pct_range.0),
                self.stats_max.unwrap_or(defaults.stats_pct_range.1),
            ),
            strict_grid_ins: self.strict_grid_ins.unwrap_or(defaults.strict_grid_ins),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RandomQuery {
    pub count: Option<usize>,
}

/// Body of POST /exam/start.
#[derive(Debug, Default, Deserialize)]
pub struct StartIn {
    #[serde(flatten)]
    pub mix: MixOverrides,
    pub minutes: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartOut {
    pub session_id: String,
    pub questions: Vec<Question>,
    pub minutes: u32,
    pub started_at: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerIn {
    pub question_id: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub flagged: Option<bool>,
    #[serde(default)]
    pub time_spent_delta_sec: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOut {
    pub saved: bool,
    pub answered_count: usize,
}

/// Per-bucket slice of a graded session.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct BucketScore {
    pub bucket: Bucket,
    pub correct: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOut {
    pub session_id: String,
    pub correct: usize,
    pub total: usize,
    pub by_bucket: Vec<BucketScore>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_resolve_field_by_field_onto_defaults() {
        let overrides = MixOverrides {
            total: Some(40),
            algebra_min: Some(0.50),
            strict_grid_ins: Some(true),
            ..MixOverrides::default()
        };
        let cfg = overrides.resolve(&MixConfig::default());
        assert_eq!(cfg.total, 40);
        assert_eq!(cfg.grid_ins, 5);
        assert_eq!(cfg.algebra_pct_range, (0.50, 0.45));
        assert_eq!(cfg.geometry_pct_range, (0.30, 0.35));
        assert!(cfg.strict_grid_ins);
    }

    #[test]
    fn empty_overrides_reproduce_the_defaults() {
        let cfg = MixOverrides::default().resolve(&MixConfig::default());
        assert_eq!(cfg.total, 57);
        assert_eq!(cfg.grid_ins, 5);
        assert_eq!(cfg.algebra_pct_range, (0.40, 0.45));
        assert_eq!(cfg.stats_pct_range, (0.15, 0.20));
        assert!(!cfg.strict_grid_ins);
    }
}
