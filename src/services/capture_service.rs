//! Live question/answer capture for an interview.
//!
//! Each (vacancy, candidate) pair owns an in-memory session that alternates
//! between recording a question and recording its answer. Every recorded turn
//! is upserted into the store as it happens; `save` replaces the stored
//! transcript with the session's turns in one batch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::database::RecruitingStore;
use crate::error::{Error, Result};
use crate::models::interview::InterviewTurn;
use crate::services::speech_service::{AudioClip, SpeechError, SpeechRecognizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureRole {
    Question,
    Answer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    AwaitingQuestion,
    AwaitingAnswer,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("A question is already waiting for its answer")]
    QuestionPending,

    #[error("There is no question to answer yet")]
    NoQuestion,
}

impl From<CaptureError> for Error {
    fn from(value: CaptureError) -> Self {
        Error::Conflict(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct CaptureSession {
    turns: Vec<InterviewTurn>,
    next_turn_id: i32,
    state: CaptureState,
    last_activity: Instant,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self {
            turns: Vec::new(),
            next_turn_id: 0,
            state: CaptureState::AwaitingQuestion,
            last_activity: Instant::now(),
        }
    }
}

impl CaptureSession {
    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn turns(&self) -> &[InterviewTurn] {
        &self.turns
    }

    pub fn accepts(&self, role: CaptureRole) -> std::result::Result<(), CaptureError> {
        match (role, self.state) {
            (CaptureRole::Question, CaptureState::AwaitingQuestion)
            | (CaptureRole::Answer, CaptureState::AwaitingAnswer) => Ok(()),
            (CaptureRole::Question, CaptureState::AwaitingAnswer) => {
                Err(CaptureError::QuestionPending)
            }
            (CaptureRole::Answer, CaptureState::AwaitingQuestion) => Err(CaptureError::NoQuestion),
        }
    }

    /// Applies recognized text for `role` and returns the turn it touched.
    pub fn record(&mut self, role: CaptureRole, text: String) -> std::result::Result<InterviewTurn, CaptureError> {
        self.accepts(role)?;
        let turn = match role {
            CaptureRole::Question => {
                let turn = InterviewTurn::question(self.next_turn_id, text);
                self.turns.push(turn.clone());
                self.state = CaptureState::AwaitingAnswer;
                turn
            }
            CaptureRole::Answer => {
                let last = self.turns.last_mut().ok_or(CaptureError::NoQuestion)?;
                last.response = text;
                let turn = last.clone();
                self.next_turn_id += 1;
                self.state = CaptureState::AwaitingQuestion;
                turn
            }
        };
        self.touch();
        Ok(turn)
    }

    pub fn reset(&mut self) {
        self.turns.clear();
        self.next_turn_id = 0;
        self.state = CaptureState::AwaitingQuestion;
        self.touch();
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub vacancy_id: Uuid,
    pub candidate_id: Uuid,
    pub state: CaptureState,
    pub next_turn_id: i32,
    pub turns: Vec<InterviewTurn>,
}

/// What the client sent for one capture: raw audio or already-recognized text.
#[derive(Debug, Clone)]
pub enum CaptureInput {
    Audio(AudioClip),
    Text(String),
}

type SessionKey = (Uuid, Uuid);

#[derive(Clone)]
pub struct CaptureService {
    sessions: Arc<Mutex<HashMap<SessionKey, Arc<Mutex<CaptureSession>>>>>,
    store: Arc<dyn RecruitingStore>,
    speech: Arc<dyn SpeechRecognizer>,
}

impl CaptureService {
    pub fn new(store: Arc<dyn RecruitingStore>, speech: Arc<dyn SpeechRecognizer>) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            store,
            speech,
        }
    }

    async fn ensure_candidate(&self, vacancy_id: Uuid, candidate_id: Uuid) -> Result<()> {
        self.store
            .get_candidate(vacancy_id, candidate_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| Error::NotFound("Candidate not found".into()))
    }

    async fn session_handle(&self, key: SessionKey) -> Arc<Mutex<CaptureSession>> {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(key).or_default().clone()
    }

    /// Locks the session registered under `key`. A handle evicted before its
    /// lock was taken is dropped and the current entry is locked instead.
    async fn lock_current(
        &self,
        key: SessionKey,
        mut handle: Arc<Mutex<CaptureSession>>,
    ) -> OwnedMutexGuard<CaptureSession> {
        loop {
            let guard = handle.clone().lock_owned().await;
            let registered = self
                .sessions
                .lock()
                .await
                .get(&key)
                .is_some_and(|current| Arc::ptr_eq(current, &handle));
            if registered {
                return guard;
            }
            drop(guard);
            handle = self.session_handle(key).await;
        }
    }

    async fn lock_session(&self, key: SessionKey) -> OwnedMutexGuard<CaptureSession> {
        let handle = self.session_handle(key).await;
        self.lock_current(key, handle).await
    }

    fn snapshot(key: SessionKey, session: &CaptureSession) -> SessionSnapshot {
        SessionSnapshot {
            vacancy_id: key.0,
            candidate_id: key.1,
            state: session.state,
            next_turn_id: session.next_turn_id,
            turns: session.turns.clone(),
        }
    }

    pub async fn session(&self, vacancy_id: Uuid, candidate_id: Uuid) -> Result<SessionSnapshot> {
        self.ensure_candidate(vacancy_id, candidate_id).await?;
        let key = (vacancy_id, candidate_id);
        let session = self.lock_session(key).await;
        Ok(Self::snapshot(key, &session))
    }

    /// Recognizes `input` and records it as `role`. The session is left
    /// untouched when the role is not currently enabled, when recognition
    /// fails, or when persisting the turn fails.
    pub async fn capture(
        &self,
        vacancy_id: Uuid,
        candidate_id: Uuid,
        role: CaptureRole,
        input: CaptureInput,
    ) -> Result<SessionSnapshot> {
        self.ensure_candidate(vacancy_id, candidate_id).await?;
        let key = (vacancy_id, candidate_id);
        let mut session = self.lock_session(key).await;
        session.accepts(role)?;

        let text = match input {
            CaptureInput::Text(text) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(Error::BadRequest("text must not be empty".into()));
                }
                text
            }
            CaptureInput::Audio(clip) => match self.speech.recognize_once(clip).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(candidate_id = %candidate_id, ?role, error = %e, "speech recognition failed");
                    return Err(if matches!(e, SpeechError::NoMatch) {
                        Error::Unprocessable(e.to_string())
                    } else {
                        Error::Upstream(e.to_string())
                    });
                }
            },
        };

        let mut next = session.clone();
        let turn = next.record(role, text)?;
        self.store.upsert_turn(candidate_id, &turn).await?;
        *session = next;

        tracing::debug!(candidate_id = %candidate_id, turn_id = turn.id, ?role, "interview turn recorded");
        Ok(Self::snapshot(key, &session))
    }

    pub async fn reset(&self, vacancy_id: Uuid, candidate_id: Uuid) -> Result<SessionSnapshot> {
        self.ensure_candidate(vacancy_id, candidate_id).await?;
        let key = (vacancy_id, candidate_id);
        let mut session = self.lock_session(key).await;
        session.reset();
        Ok(Self::snapshot(key, &session))
    }

    /// Replaces the stored transcript with the session's turns.
    pub async fn save(&self, vacancy_id: Uuid, candidate_id: Uuid) -> Result<Vec<InterviewTurn>> {
        self.ensure_candidate(vacancy_id, candidate_id).await?;
        let session = self.lock_session((vacancy_id, candidate_id)).await;
        if session.turns.is_empty() {
            return Err(Error::BadRequest(
                "No hay preguntas ni respuestas para guardar.".into(),
            ));
        }
        self.store.replace_turns(candidate_id, &session.turns).await?;
        tracing::info!(candidate_id = %candidate_id, turns = session.turns.len(), "interview saved");
        Ok(session.turns.clone())
    }

    pub async fn list_turns(&self, vacancy_id: Uuid, candidate_id: Uuid) -> Result<Vec<InterviewTurn>> {
        self.ensure_candidate(vacancy_id, candidate_id).await?;
        self.store.list_turns(candidate_id).await
    }

    /// Drops the in-memory session of a removed candidate.
    pub async fn forget(&self, vacancy_id: Uuid, candidate_id: Uuid) {
        self.sessions.lock().await.remove(&(vacancy_id, candidate_id));
    }

    pub async fn forget_vacancy(&self, vacancy_id: Uuid) {
        self.sessions
            .lock()
            .await
            .retain(|(vid, _), _| *vid != vacancy_id);
    }

    /// Removes sessions idle for at least `max_idle`. Sessions locked by an
    /// in-flight capture are kept. Returns how many were evicted.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, handle| match handle.try_lock() {
            Ok(session) => session.idle_for(now) < max_idle,
            Err(_) => true,
        });
        before - sessions.len()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
