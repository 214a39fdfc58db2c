//! Domain models used by the backend: questions, topic buckets, and exam sessions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How the student answers a question.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
  /// Pick one of the lettered options.
  MultipleChoice,
  /// Type a numeric or fractional answer (e.g. "-4" or "3/10").
  GridIn,
}

/// Where did we get the question from?
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum QuestionSource {
  LocalBank, // from the TOML bank config
  BankFile,  // from a JSON file in the bank directory
  Seed,      // built-in seeds (last resort)
}
impl Default for QuestionSource {
  fn default() -> Self { QuestionSource::BankFile }
}

/// One lettered option of a multiple-choice question.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Choice {
  pub key: String,
  pub text: String,
}

/// Coarse topic bucket derived from a question's free-text category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
  Algebra,
  Geometry,
  #[serde(rename = "statsprob")]
  StatsProb,
  Other,
}

/// Core question record kept in the in-memory bank.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Question {
  pub id: String,
  /// Display number within a composed set; rewritten on every composition.
  #[serde(default)]
  pub index: usize,
  #[serde(rename = "type")]
  pub question_type: QuestionType,
  /// Free-text category label (e.g. "Algebra", "Ratios", "Volume"); may be empty.
  #[serde(default)]
  pub category: String,
  pub stem: String,
  /// Empty for grid-ins.
  #[serde(default)]
  pub choices: Vec<Choice>,
  /// Option key ("A"..) or a numeric/fraction string like "-4" or "3/10".
  pub answer: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub media: Option<String>,
  #[serde(default)]
  pub source: QuestionSource,
}

/// One saved answer within a session.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
  #[serde(default)]
  pub answer: Option<String>,
  #[serde(default)]
  pub flagged: bool,
  #[serde(default)]
  pub time_spent_sec: u64,
}

/// A practice session: the composed question set plus the student's answer records.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamSession {
  pub id: String,
  pub questions: Vec<Question>,
  pub answers: HashMap<String, AnswerRecord>,
  /// Unix seconds at session creation.
  pub started_at: u64,
  pub minutes: u32,
  pub submitted: bool,
}
