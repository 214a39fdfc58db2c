//! Core behaviors shared by the HTTP handlers.
//!
//! This includes:
//!   - Composing a stratified exam set from a live bank snapshot
//!   - Plain random picks (no mix constraints)
//!   - Grading single answers and whole sessions

use tracing::{info, instrument};

use crate::classify::bucket_of;
use crate::domain::{Bucket, ExamSession, Question, QuestionType};
use crate::protocol::{BucketScore, SubmitOut};
use crate::sampler::{compose_exam, shuffled, ComposeError, MixConfig};
use crate::scoring::{choice_answer_correct, grid_answer_correct};
use crate::state::{AppState, SessionError};

/// Compose one exam set from the current bank. Each call takes its own
/// snapshot and a fresh thread RNG, so concurrent requests never share
/// shuffle state.
#[instrument(level = "info", skip(state, cfg), fields(total = cfg.total, grid_ins = cfg.grid_ins))]
pub async fn compose_from_state(
  state: &AppState,
  cfg: &MixConfig,
) -> Result<Vec<Question>, ComposeError> {
  let pool = state.pool_snapshot().await;
  let set = compose_exam(&pool, cfg, &mut rand::thread_rng())?;
  info!(target: "exam", pool = pool.len(), composed = set.len(), "Composed exam set");
  Ok(set)
}

/// Uniform random pick of up to `count` questions (at least one when the
/// bank is non-empty), re-indexed 1..=len.
#[instrument(level = "info", skip(state), fields(%count))]
pub async fn random_pick(state: &AppState, count: usize) -> Vec<Question> {
  let pool = state.pool_snapshot().await;
  let n = count.max(1).min(pool.len());
  let mut picked = shuffled(&pool, &mut rand::thread_rng());
  picked.truncate(n);
  for (i, q) in picked.iter_mut().enumerate() {
    q.index = i + 1;
  }
  picked
}

/// Compose a set, then wrap it in a stored session.
#[instrument(level = "info", skip(state, cfg), fields(%minutes))]
pub async fn start_exam(
  state: &AppState,
  cfg: &MixConfig,
  minutes: u32,
) -> Result<ExamSession, ComposeError> {
  let questions = compose_from_state(state, cfg).await?;
  Ok(state.create_session(questions, minutes).await)
}

/// Mark a session submitted and grade it.
#[instrument(level = "info", skip(state), fields(%session_id))]
pub async fn submit_exam(state: &AppState, session_id: &str) -> Result<SubmitOut, SessionError> {
  let session = state.mark_submitted(session_id).await?;
  let out = grade_session(&session);
  info!(target: "exam", id = %session_id, correct = out.correct, total = out.total, "Session graded");
  Ok(out)
}

/// Grade a single question against an answer, if one was given.
pub fn is_correct(question: &Question, given: Option<&str>) -> bool {
  match (question.question_type, given) {
    (_, None) => false,
    (QuestionType::GridIn, Some(g)) => grid_answer_correct(g, &question.answer),
    (QuestionType::MultipleChoice, Some(g)) => choice_answer_correct(g, &question.answer),
  }
}

/// Tally a session overall and per topic bucket. Unanswered counts as wrong.
pub fn grade_session(session: &ExamSession) -> SubmitOut {
  let buckets = [Bucket::Algebra, Bucket::Geometry, Bucket::StatsProb, Bucket::Other];
  let mut by_bucket: Vec<BucketScore> = buckets
    .iter()
    .map(|&bucket| BucketScore { bucket, correct: 0, total: 0 })
    .collect();
  let mut correct = 0usize;

  for question in &session.questions {
    let given = session
      .answers
      .get(&question.id)
      .and_then(|r| r.answer.as_deref());
    let ok = is_correct(question, given);
    let slot = buckets
      .iter()
      .position(|&b| b == bucket_of(question))
      .unwrap_or(buckets.len() - 1);
    by_bucket[slot].total += 1;
    if ok {
      by_bucket[slot].correct += 1;
      correct += 1;
    }
  }

  SubmitOut {
    session_id: session.id.clone(),
    correct,
    total: session.questions.len(),
    by_bucket,
  }
}

#[cfg(test)]
mod tests {
  use std::collections::HashMap;

  use super::*;
  use crate::domain::{AnswerRecord, QuestionSource};

  fn q(id: &str, question_type: QuestionType, category: &str, answer: &str) -> Question {
    Question {
      id: id.into(),
      index: 0,
      question_type,
      category: category.into(),
      stem: format!("stem {id}"),
      choices: vec![],
      answer: answer.into(),
      media: None,
      source: QuestionSource::Seed,
    }
  }

  fn answered(answer: &str) -> AnswerRecord {
    AnswerRecord { answer: Some(answer.into()), flagged: false, time_spent_sec: 0 }
  }

  #[test]
  fn grading_dispatches_by_question_type() {
    let grid = q("g", QuestionType::GridIn, "Probability", "3/10");
    assert!(is_correct(&grid, Some("0.3")));
    assert!(!is_correct(&grid, Some("0.31")));
    assert!(!is_correct(&grid, None));

    let mc = q("m", QuestionType::MultipleChoice, "Algebra", "B");
    assert!(is_correct(&mc, Some("b")));
    assert!(!is_correct(&mc, Some("0.3")));
  }

  #[test]
  fn session_tallies_split_by_bucket() {
    let questions = vec![
      q("a1", QuestionType::MultipleChoice, "Algebra", "A"),
      q("a2", QuestionType::MultipleChoice, "Ratios", "B"),
      q("g1", QuestionType::GridIn, "Volume", "64"),
      q("s1", QuestionType::MultipleChoice, "Probability", "C"),
      q("o1", QuestionType::MultipleChoice, "Number Properties", "D"),
    ];
    let mut answers = HashMap::new();
    answers.insert("a1".to_string(), answered("A")); // right
    answers.insert("a2".to_string(), answered("C")); // wrong
    answers.insert("g1".to_string(), answered("64.0")); // right, numeric
    answers.insert("s1".to_string(), answered("C")); // right
    // o1 left unanswered

    let session = ExamSession {
      id: "s".into(),
      questions,
      answers,
      started_at: 0,
      minutes: 90,
      submitted: true,
    };
    let out = grade_session(&session);
    assert_eq!(out.total, 5);
    assert_eq!(out.correct, 3);
    assert_eq!(out.by_bucket[0], BucketScore { bucket: Bucket::Algebra, correct: 1, total: 2 });
    assert_eq!(out.by_bucket[1], BucketScore { bucket: Bucket::Geometry, correct: 1, total: 1 });
    assert_eq!(out.by_bucket[2], BucketScore { bucket: Bucket::StatsProb, correct: 1, total: 1 });
    assert_eq!(out.by_bucket[3], BucketScore { bucket: Bucket::Other, correct: 0, total: 1 });
  }
}
