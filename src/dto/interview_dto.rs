use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::interview::InterviewTurn;
use crate::services::ai_service::InterviewSummaryStyle;
use crate::services::capture_service::{CaptureState, SessionSnapshot};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub vacancy_id: Uuid,
    pub candidate_id: Uuid,
    pub state: CaptureState,
    pub next_turn_id: i32,
    pub question_enabled: bool,
    pub answer_enabled: bool,
    pub turns: Vec<InterviewTurn>,
}

impl From<SessionSnapshot> for SessionResponse {
    fn from(value: SessionSnapshot) -> Self {
        Self {
            vacancy_id: value.vacancy_id,
            candidate_id: value.candidate_id,
            question_enabled: value.state == CaptureState::AwaitingQuestion,
            answer_enabled: value.state == CaptureState::AwaitingAnswer,
            state: value.state,
            next_turn_id: value.next_turn_id,
            turns: value.turns,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSessionResponse {
    pub saved: usize,
    pub turns: Vec<InterviewTurn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSummaryPayload {
    pub style: InterviewSummaryStyle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSummaryResponse {
    pub style: InterviewSummaryStyle,
    pub interviewees: usize,
    pub summary: String,
    pub lines: Vec<String>,
}
