//! Loading the question bank (mix defaults + questions) from TOML and JSON.
//!
//! Two optional sources, both env-driven:
//!   BANK_CONFIG_PATH : one TOML file with an optional [mix] table and
//!                      [[questions]] entries
//!   BANK_DIR         : a directory where every *.json file is an array of
//!                      question objects
//!
//! Bad files and bad entries are skipped with a log line; the server still
//! boots on built-in seeds alone.

use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::{Choice, Question, QuestionSource, QuestionType};
use crate::sampler::MixConfig;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BankConfig {
  #[serde(default)]
  pub mix: MixConfig,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Question entry accepted in TOML configuration. Fields are optional so one
/// malformed entry can be skipped instead of failing the whole file.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  #[serde(default)] pub id: Option<String>,
  #[serde(default, rename = "type")] pub question_type: Option<QuestionType>,
  #[serde(default)] pub category: Option<String>,
  #[serde(default)] pub stem: Option<String>,
  #[serde(default)] pub choices: Vec<Choice>,
  #[serde(default)] pub answer: Option<String>,
  #[serde(default)] pub media: Option<String>,
}

/// Attempt to load `BankConfig` from BANK_CONFIG_PATH. On any parsing/IO
/// error, returns None.
pub fn load_bank_config_from_env() -> Option<BankConfig> {
  let path = std::env::var("BANK_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<BankConfig>(&s) {
      Ok(cfg) => {
        info!(target: "gridprep_backend", %path, questions = cfg.questions.len(), "Loaded bank config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "gridprep_backend", %path, error = %e, "Failed to parse TOML bank config");
        None
      }
    },
    Err(e) => {
      error!(target: "gridprep_backend", %path, error = %e, "Failed to read TOML bank config file");
      None
    }
  }
}

/// Validate config entries into bank questions. Entries missing a type, stem
/// or answer are skipped with a log; entries without an id get a fresh one.
pub fn questions_from_config(cfg: &BankConfig) -> Vec<Question> {
  let mut out = Vec::new();
  for qc in &cfg.questions {
    let id = qc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
    let question_type = match qc.question_type {
      Some(t) => t,
      None => {
        error!(target: "exam", %id, "Skipping bank entry: missing type.");
        continue;
      }
    };
    let stem = match &qc.stem {
      Some(s) if !s.is_empty() => s.clone(),
      _ => {
        error!(target: "exam", %id, "Skipping bank entry: missing stem.");
        continue;
      }
    };
    let answer = match &qc.answer {
      Some(a) if !a.is_empty() => a.clone(),
      _ => {
        error!(target: "exam", %id, "Skipping bank entry: missing answer.");
        continue;
      }
    };
    out.push(Question {
      id,
      index: 0,
      question_type,
      category: qc.category.clone().unwrap_or_default(),
      stem,
      choices: qc.choices.clone(),
      answer,
      media: qc.media.clone(),
      source: QuestionSource::LocalBank,
    });
  }
  out
}

/// Load questions from every *.json file under BANK_DIR. Returns an empty
/// vector when the variable is unset.
pub fn load_bank_files_from_env() -> Vec<Question> {
  match std::env::var("BANK_DIR") {
    Ok(dir) => load_bank_files(&dir),
    Err(_) => Vec::new(),
  }
}

/// Read a directory of JSON bank files. Each file holds an array of question
/// objects; invalid files and invalid entries are skipped, never fatal.
pub fn load_bank_files(dir: &str) -> Vec<Question> {
  let entries = match std::fs::read_dir(dir) {
    Ok(e) => e,
    Err(e) => {
      error!(target: "gridprep_backend", %dir, error = %e, "Failed to read bank directory");
      return Vec::new();
    }
  };

  let mut out = Vec::new();
  for entry in entries.flatten() {
    let path = entry.path();
    if path.extension().and_then(|e| e.to_str()) != Some("json") {
      continue;
    }
    let raw = match std::fs::read_to_string(&path) {
      Ok(r) => r,
      Err(e) => {
        warn!(target: "gridprep_backend", path = %path.display(), error = %e, "Skipping unreadable bank file");
        continue;
      }
    };
    let values = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
      Ok(v) => v,
      Err(e) => {
        warn!(target: "gridprep_backend", path = %path.display(), error = %e, "Skipping invalid bank file");
        continue;
      }
    };
    let mut kept = 0usize;
    for value in values {
      match serde_json::from_value::<Question>(value) {
        Ok(mut q) if !q.id.is_empty() => {
          q.source = QuestionSource::BankFile;
          out.push(q);
          kept += 1;
        }
        Ok(_) => {
          warn!(target: "exam", path = %path.display(), "Skipping bank entry with empty id");
        }
        Err(e) => {
          warn!(target: "exam", path = %path.display(), error = %e, "Skipping invalid bank entry");
        }
      }
    }
    info!(target: "gridprep_backend", path = %path.display(), count = kept, "Loaded bank file");
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mix_table_and_questions_parse_from_toml() {
    let cfg: BankConfig = toml::from_str(
      r#"
      [mix]
      total = 40
      grid_ins = 4
      algebra_pct_range = [0.35, 0.40]

      [[questions]]
      id = "t-1"
      type = "MULTIPLE_CHOICE"
      category = "Ratios"
      stem = "The ratio of red to blue marbles is 3:5. Out of 40 marbles, how many are blue?"
      answer = "C"
      choices = [
        { key = "A", text = "15" },
        { key = "B", text = "20" },
        { key = "C", text = "25" },
        { key = "D", text = "30" },
      ]

      [[questions]]
      type = "GRID_IN"
      category = "Probability"
      stem = "A bag holds 3 red and 7 green marbles. What is the probability of drawing red?"
      answer = "3/10"
      "#,
    )
    .expect("toml");

    assert_eq!(cfg.mix.total, 40);
    assert_eq!(cfg.mix.grid_ins, 4);
    assert_eq!(cfg.mix.algebra_pct_range, (0.35, 0.40));
    // untouched bands keep their defaults
    assert_eq!(cfg.mix.geometry_pct_range, (0.30, 0.35));

    let questions = questions_from_config(&cfg);
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].id, "t-1");
    assert_eq!(questions[0].question_type, QuestionType::MultipleChoice);
    assert_eq!(questions[0].choices.len(), 4);
    // entries without an id get a generated one
    assert!(!questions[1].id.is_empty());
    assert_eq!(questions[1].source, QuestionSource::LocalBank);
  }

  #[test]
  fn incomplete_entries_are_skipped_not_fatal() {
    let cfg: BankConfig = toml::from_str(
      r#"
      [[questions]]
      id = "no-stem"
      type = "MULTIPLE_CHOICE"
      answer = "A"

      [[questions]]
      id = "no-answer"
      type = "GRID_IN"
      stem = "What is 2 + 2?"

      [[questions]]
      id = "no-type"
      stem = "What is 2 + 2?"
      answer = "4"

      [[questions]]
      id = "ok"
      type = "GRID_IN"
      stem = "What is 2 + 2?"
      answer = "4"
      "#,
    )
    .expect("toml");

    let questions = questions_from_config(&cfg);
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].id, "ok");
  }

  #[test]
  fn missing_config_sections_fall_back_to_defaults() {
    let cfg: BankConfig = toml::from_str("").expect("toml");
    assert_eq!(cfg.mix.total, 57);
    assert_eq!(cfg.mix.grid_ins, 5);
    assert!(!cfg.mix.strict_grid_ins);
    assert!(questions_from_config(&cfg).is_empty());
  }
}
