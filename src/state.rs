//! Application state: the in-memory question bank and the session store.
//!
//! This module owns:
//!   - the question index (by id), merged from TOML config, JSON bank files
//!     and built-in seeds
//!   - the mix defaults used when a request does not override them
//!   - the practice-session store and its mutation rules
//!
//! Everything is in memory; durable storage is a collaborator this backend
//! does not own.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::classify::bucket_of;
use crate::config::{load_bank_config_from_env, load_bank_files_from_env, questions_from_config};
use crate::domain::{AnswerRecord, Bucket, ExamSession, Question, QuestionSource, QuestionType};
use crate::sampler::MixConfig;
use crate::seeds::seed_questions;

/// Store-level failures surfaced to the HTTP layer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
    #[error("question {0} is not part of this session")]
    UnknownQuestion(String),
    #[error("session {0} is already submitted")]
    AlreadySubmitted(String),
}

#[derive(Clone)]
pub struct AppState {
    pub by_id: Arc<RwLock<HashMap<String, Question>>>,
    pub sessions: Arc<RwLock<HashMap<String, ExamSession>>>,
    pub mix_defaults: MixConfig,
}

impl AppState {
    /// Build state from env: load the TOML bank config and JSON bank files,
    /// merge in seeds, and log the startup inventory.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg_opt = load_bank_config_from_env();
        let mix_defaults = cfg_opt.as_ref().map(|c| c.mix.clone()).unwrap_or_default();

        let config_questions = cfg_opt
            .as_ref()
            .map(questions_from_config)
            .unwrap_or_default();
        let id_map = build_question_index(
            config_questions,
            load_bank_files_from_env(),
            seed_questions(),
        );

        log_inventory(&id_map);

        Self {
            by_id: Arc::new(RwLock::new(id_map)),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            mix_defaults,
        }
    }

    /// Clone of the whole bank; each composition works on its own snapshot.
    #[instrument(level = "debug", skip(self))]
    pub async fn pool_snapshot(&self) -> Vec<Question> {
        self.by_id.read().await.values().cloned().collect()
    }

    /// Create and store a session around an already-composed question set.
    #[instrument(level = "info", skip(self, questions), fields(count = questions.len(), %minutes))]
    pub async fn create_session(&self, questions: Vec<Question>, minutes: u32) -> ExamSession {
        let session = ExamSession {
            id: Uuid::new_v4().to_string(),
            questions,
            answers: HashMap::new(),
            started_at: unix_now(),
            minutes,
            submitted: false,
        };
        self.sessions
            .write()
            .await
            .insert(session.id.clone(), session.clone());
        info!(target: "exam", id = %session.id, "Session created");
        session
    }

    /// Read-only access to a session by id.
    #[instrument(level = "debug", skip(self), fields(%id))]
    pub async fn get_session(&self, id: &str) -> Option<ExamSession> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Upsert one answer record. Time deltas accumulate; answer and flag
    /// overwrite only when present in the request.
    #[instrument(level = "debug", skip(self, answer), fields(%session_id, %question_id))]
    pub async fn save_answer(
        &self,
        session_id: &str,
        question_id: &str,
        answer: Option<String>,
        flagged: Option<bool>,
        time_spent_delta_sec: u64,
    ) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionError::UnknownSession(session_id.into()))?;
        if session.submitted {
            return Err(SessionError::AlreadySubmitted(session_id.into()));
        }
        if !session.questions.iter().any(|q| q.id == question_id) {
            return Err(SessionError::UnknownQuestion(question_id.into()));
        }

        let record: &mut AnswerRecord = session.answers.entry(question_id.to_string()).or_default();
        if let Some(a) = answer {
            record.answer = if a.is_empty() { None } else { Some(a) };
        }
        if let Some(f) = flagged {
            record.flagged = f;
        }
        record.time_spent_sec += time_spent_delta_sec;

        Ok(session.answers.values().filter(|r| r.answer.is_some()).count())
    }

    /// Mark a session submitted and return it. Idempotent: re-submitting an
    /// already-submitted session returns it unchanged.
    #[instrument(level = "info", skip(self), fields(%id))]
    pub async fn mark_submitted(&self, id: &str) -> Result<ExamSession, SessionError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::UnknownSession(id.into()))?;
        session.submitted = true;
        Ok(session.clone())
    }
}

/// Merge question sources into the id index. Earlier sources win id
/// conflicts: TOML config first, then JSON bank files, then seeds.
pub fn build_question_index(
    config_questions: Vec<Question>,
    file_questions: Vec<Question>,
    seeds: Vec<Question>,
) -> HashMap<String, Question> {
    let mut id_map = HashMap::new();
    for q in config_questions.into_iter().chain(file_questions).chain(seeds) {
        id_map.entry(q.id.clone()).or_insert(q);
    }
    id_map
}

fn log_inventory(id_map: &HashMap<String, Question>) {
    let mut local_bank = 0usize;
    let mut bank_files = 0usize;
    let mut seed = 0usize;
    let mut per_bucket = [0usize; 4];
    let mut grid_ins = 0usize;
    for q in id_map.values() {
        match q.source {
            QuestionSource::LocalBank => local_bank += 1,
            QuestionSource::BankFile => bank_files += 1,
            QuestionSource::Seed => seed += 1,
        }
        match bucket_of(q) {
            Bucket::Algebra => per_bucket[0] += 1,
            Bucket::Geometry => per_bucket[1] += 1,
            Bucket::StatsProb => per_bucket[2] += 1,
            Bucket::Other => per_bucket[3] += 1,
        }
        if q.question_type == QuestionType::GridIn {
            grid_ins += 1;
        }
    }
    info!(
        target: "exam",
        total = id_map.len(),
        local_bank,
        bank_files,
        seed,
        "Startup question inventory"
    );
    info!(
        target: "exam",
        algebra = per_bucket[0],
        geometry = per_bucket[1],
        statsprob = per_bucket[2],
        other = per_bucket[3],
        grid_ins,
        "Bank composition"
    );
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::seed_questions;

    fn tagged(id: &str, source: QuestionSource) -> Question {
        Question {
            id: id.into(),
            index: 0,
            question_type: QuestionType::MultipleChoice,
            category: "Algebra".into(),
            stem: "stem".into(),
            choices: vec![],
            answer: "A".into(),
            media: None,
            source,
        }
    }

    #[test]
    fn earlier_sources_win_id_conflicts() {
        let index = build_question_index(
            vec![tagged("q-1", QuestionSource::LocalBank)],
            vec![tagged("q-1", QuestionSource::BankFile), tagged("q-2", QuestionSource::BankFile)],
            vec![tagged("q-1", QuestionSource::Seed), tagged("q-3", QuestionSource::Seed)],
        );
        assert_eq!(index.len(), 3);
        assert_eq!(index["q-1"].source, QuestionSource::LocalBank);
        assert_eq!(index["q-2"].source, QuestionSource::BankFile);
        assert_eq!(index["q-3"].source, QuestionSource::Seed);
    }

    #[tokio::test]
    async fn answers_accumulate_time_and_overwrite_choice() {
        let state = AppState::new();
        let session = state.create_session(seed_questions(), 90).await;
        let qid = "seed-alg-linear";

        let answered = state
            .save_answer(&session.id, qid, Some("A".into()), None, 30)
            .await
            .expect("save");
        assert_eq!(answered, 1);

        state
            .save_answer(&session.id, qid, Some("B".into()), Some(true), 15)
            .await
            .expect("save again");
        let stored = state.get_session(&session.id).await.expect("session");
        let record = &stored.answers[qid];
        assert_eq!(record.answer.as_deref(), Some("B"));
        assert!(record.flagged);
        assert_eq!(record.time_spent_sec, 45);
    }

    #[tokio::test]
    async fn saving_after_submit_is_rejected() {
        let state = AppState::new();
        let session = state.create_session(seed_questions(), 90).await;
        state.mark_submitted(&session.id).await.expect("submit");

        let err = state
            .save_answer(&session.id, "seed-alg-linear", Some("A".into()), None, 0)
            .await
            .expect_err("must reject");
        assert_eq!(err, SessionError::AlreadySubmitted(session.id.clone()));

        // submit stays idempotent
        let again = state.mark_submitted(&session.id).await.expect("resubmit");
        assert!(again.submitted);
    }

    #[tokio::test]
    async fn unknown_targets_are_reported() {
        let state = AppState::new();
        let session = state.create_session(seed_questions(), 90).await;

        let err = state
            .save_answer("nope", "seed-alg-linear", None, None, 0)
            .await
            .expect_err("unknown session");
        assert_eq!(err, SessionError::UnknownSession("nope".into()));

        let err = state
            .save_answer(&session.id, "not-a-question", None, None, 0)
            .await
            .expect_err("unknown question");
        assert_eq!(err, SessionError::UnknownQuestion("not-a-question".into()));
    }
}
