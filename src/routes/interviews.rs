//! Interview routes: CRUD plus answer recording.
//!
//! Every handler is guarded. Interviews owned by another user read as 404,
//! the same as missing ones.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{error, info};

use crate::guard::SignedIn;
use crate::model::{Interview, InterviewPatch, NewInterview, QuestionAnswer, UserAnswer};
use crate::services::interview::{InterviewError, JobInfo, generate_questions, record_answer, validate_patch};
use crate::state::AppState;
use crate::store::StoreError;

// =============================================================================
// REQUEST / RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInterviewRequest {
    pub position: String,
    pub description: String,
    pub experience: i64,
    pub tech_stack: String,
    /// Generated by the AI collaborator when absent.
    #[serde(default)]
    pub questions: Option<Vec<QuestionAnswer>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInterviewRequest {
    #[serde(flatten)]
    pub patch: InterviewPatch,
    /// Replace the questions with a fresh AI-generated set.
    #[serde(default)]
    pub regenerate_questions: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAnswerRequest {
    pub question: String,
    pub user_answer: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn store_error_to_status(err: StoreError) -> StatusCode {
    match err {
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Request(_) | StoreError::Response { .. } | StoreError::Decode(_) | StoreError::Value(_) => {
            StatusCode::BAD_GATEWAY
        }
        StoreError::MissingConfig(_) | StoreError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn interview_error_to_status(err: InterviewError) -> StatusCode {
    match err {
        InterviewError::NotFound(_) => StatusCode::NOT_FOUND,
        InterviewError::Invalid(_) | InterviewError::UnknownQuestion | InterviewError::AnswerTooShort => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        InterviewError::AlreadyAnswered => StatusCode::CONFLICT,
        InterviewError::AiUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        InterviewError::Ai(e) => {
            error!(error = %e, "AI request failed");
            StatusCode::BAD_GATEWAY
        }
        InterviewError::BadAiOutput(_) => StatusCode::BAD_GATEWAY,
        InterviewError::Store(e) => store_error_to_status(e),
    }
}

/// Load an interview the caller owns.
async fn owned_interview(state: &AppState, caller: &SignedIn, id: &str) -> Result<Interview, InterviewError> {
    state
        .data
        .get_interview(id)
        .await
        .filter(|i| i.user_id == caller.user_id)
        .ok_or_else(|| InterviewError::NotFound(id.to_string()))
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/interviews`
pub async fn list(State(state): State<AppState>, caller: SignedIn) -> Json<Vec<Interview>> {
    Json(state.data.get_user_interviews(&caller.user_id).await)
}

/// `POST /api/interviews`
pub async fn create(
    State(state): State<AppState>,
    caller: SignedIn,
    Json(body): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), StatusCode> {
    let job = JobInfo {
        position: body.position.trim().to_string(),
        description: body.description.trim().to_string(),
        experience: body.experience,
        tech_stack: body.tech_stack.trim().to_string(),
    };
    job.validate().map_err(interview_error_to_status)?;

    let questions = match body.questions {
        Some(questions) if !questions.is_empty() => questions,
        _ => generate_questions(state.llm(), &job)
            .await
            .map_err(interview_error_to_status)?,
    };

    let record = NewInterview {
        position: job.position,
        description: job.description,
        experience: job.experience,
        user_id: caller.user_id,
        tech_stack: job.tech_stack,
        questions,
    };
    let id = state
        .data
        .create_interview(&record)
        .await
        .map_err(store_error_to_status)?;

    info!(interview_id = %id, user_id = %record.user_id, "interview created");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// `GET /api/interviews/{id}`
pub async fn get(
    State(state): State<AppState>,
    caller: SignedIn,
    Path(id): Path<String>,
) -> Result<Json<Interview>, StatusCode> {
    owned_interview(&state, &caller, &id)
        .await
        .map(Json)
        .map_err(interview_error_to_status)
}

/// `PATCH /api/interviews/{id}`: returns the interview with the patch applied.
pub async fn update(
    State(state): State<AppState>,
    caller: SignedIn,
    Path(id): Path<String>,
    Json(body): Json<UpdateInterviewRequest>,
) -> Result<Json<Interview>, StatusCode> {
    let mut interview = owned_interview(&state, &caller, &id)
        .await
        .map_err(interview_error_to_status)?;

    let mut patch = body.patch;
    if body.regenerate_questions && patch.questions.is_none() {
        let job = JobInfo::patched(&interview, &patch);
        let questions = generate_questions(state.llm(), &job)
            .await
            .map_err(interview_error_to_status)?;
        patch.questions = Some(questions);
    }
    validate_patch(&patch).map_err(interview_error_to_status)?;

    state
        .data
        .update_interview(&id, &patch)
        .await
        .map_err(store_error_to_status)?;

    patch.apply(&mut interview, OffsetDateTime::now_utc());
    Ok(Json(interview))
}

/// `GET /api/interviews/{id}/answers`: the caller's answers only.
pub async fn list_answers(
    State(state): State<AppState>,
    caller: SignedIn,
    Path(id): Path<String>,
) -> Result<Json<Vec<UserAnswer>>, StatusCode> {
    let interview = owned_interview(&state, &caller, &id)
        .await
        .map_err(interview_error_to_status)?;

    let answers = state
        .data
        .get_user_answers(&interview.id)
        .await
        .into_iter()
        .filter(|a| a.user_id == caller.user_id)
        .collect();
    Ok(Json(answers))
}

/// `POST /api/interviews/{id}/answers`
pub async fn save_answer(
    State(state): State<AppState>,
    caller: SignedIn,
    Path(id): Path<String>,
    Json(body): Json<SaveAnswerRequest>,
) -> Result<(StatusCode, Json<CreatedResponse>), StatusCode> {
    let interview = owned_interview(&state, &caller, &id)
        .await
        .map_err(interview_error_to_status)?;

    let answer_id = record_answer(
        &state.data,
        state.llm(),
        &interview,
        &caller.user_id,
        &body.question,
        &body.user_answer,
    )
    .await
    .map_err(interview_error_to_status)?;

    info!(answer_id = %answer_id, interview_id = %id, "answer recorded");
    Ok((StatusCode::CREATED, Json(CreatedResponse { id: answer_id })))
}

#[cfg(test)]
#[path = "interviews_test.rs"]
mod tests;
