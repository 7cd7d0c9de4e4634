//! Interview service: question generation and answer recording.
//!
//! DESIGN
//! ======
//! The AI collaborator is passed in as `Option<&dyn LlmChat>` so callers
//! decide what "unconfigured" means and tests can script replies. Prompt
//! building and response parsing are pure functions.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is an `InterviewError`; route handlers map it to a status
//! code. Model output that does not parse is `BadAiOutput`, never a panic.

use serde::Deserialize;
use tracing::{info, warn};

use crate::llm::{LlmChat, LlmError};
use crate::model::{Interview, InterviewPatch, NewUserAnswer, QuestionAnswer};
use crate::store::{DataService, StoreError};

/// Answers shorter than this (after trimming) are rejected.
pub const MIN_ANSWER_CHARS: usize = 30;
/// Questions requested per interview.
pub const QUESTION_COUNT: usize = 5;
const MAX_RATING: f64 = 10.0;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InterviewError {
    #[error("interview not found: {0}")]
    NotFound(String),
    #[error("invalid interview: {0}")]
    Invalid(String),
    #[error("question is not part of this interview")]
    UnknownQuestion,
    #[error("answer must be at least {MIN_ANSWER_CHARS} characters")]
    AnswerTooShort,
    #[error("question already answered")]
    AlreadyAnswered,
    #[error("AI collaborator is not configured")]
    AiUnavailable,
    #[error("AI request failed: {0}")]
    Ai(#[from] LlmError),
    #[error("AI output could not be parsed: {0}")]
    BadAiOutput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Job description the questions are generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    pub position: String,
    pub description: String,
    pub experience: i64,
    pub tech_stack: String,
}

impl JobInfo {
    /// # Errors
    ///
    /// Returns `Invalid` when a text field is blank or experience is negative.
    pub fn validate(&self) -> Result<(), InterviewError> {
        require_text("position", &self.position)?;
        require_text("description", &self.description)?;
        require_text("techStack", &self.tech_stack)?;
        require_experience(self.experience)
    }

    /// Job info after applying `patch` to `interview`.
    #[must_use]
    pub fn patched(interview: &Interview, patch: &InterviewPatch) -> Self {
        Self {
            position: patch.position.clone().unwrap_or_else(|| interview.position.clone()),
            description: patch.description.clone().unwrap_or_else(|| interview.description.clone()),
            experience: patch.experience.unwrap_or(interview.experience),
            tech_stack: patch.tech_stack.clone().unwrap_or_else(|| interview.tech_stack.clone()),
        }
    }
}

/// Rating and commentary for one answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    pub rating: f64,
    pub feedback: String,
}

fn require_text(field: &str, value: &str) -> Result<(), InterviewError> {
    if value.trim().is_empty() {
        return Err(InterviewError::Invalid(format!("{field} is required")));
    }
    Ok(())
}

fn require_experience(years: i64) -> Result<(), InterviewError> {
    if years < 0 {
        return Err(InterviewError::Invalid("experience must not be negative".into()));
    }
    Ok(())
}

/// Check the fields a patch sets. Unset fields are not validated.
///
/// # Errors
///
/// Returns `Invalid` for an empty patch or an invalid field value.
pub fn validate_patch(patch: &InterviewPatch) -> Result<(), InterviewError> {
    if patch.is_empty() {
        return Err(InterviewError::Invalid("no fields to update".into()));
    }
    if let Some(position) = &patch.position {
        require_text("position", position)?;
    }
    if let Some(description) = &patch.description {
        require_text("description", description)?;
    }
    if let Some(tech_stack) = &patch.tech_stack {
        require_text("techStack", tech_stack)?;
    }
    if let Some(experience) = patch.experience {
        require_experience(experience)?;
    }
    if patch.questions.as_ref().is_some_and(Vec::is_empty) {
        return Err(InterviewError::Invalid("questions must not be empty".into()));
    }
    Ok(())
}

// =============================================================================
// PROMPTS
// =============================================================================

#[must_use]
pub fn question_prompt(job: &JobInfo) -> String {
    format!(
        "As an experienced prompt engineer, generate a JSON array containing {QUESTION_COUNT} technical \
         interview questions along with detailed answers based on the following job information. \
         Each object in the array should have the fields \"question\" and \"answer\", formatted as follows:\n\n\
         [\n  {{ \"question\": \"<Question text>\", \"answer\": \"<Answer text>\" }},\n  ...\n]\n\n\
         Job Information:\n\
         - Job Position: {position}\n\
         - Job Description: {description}\n\
         - Years of Experience Required: {experience}\n\
         - Tech Stacks: {tech_stack}\n\n\
         The questions should assess skills in {tech_stack} development and best practices, \
         problem-solving, and experience handling complex requirements. Please format the output \
         strictly as an array of JSON objects without any additional labels, code blocks, or explanations. \
         Return only the JSON array with questions and answers.",
        position = job.position,
        description = job.description,
        experience = job.experience,
        tech_stack = job.tech_stack,
    )
}

#[must_use]
pub fn feedback_prompt(question: &str, correct_answer: &str, user_answer: &str) -> String {
    format!(
        "Question: \"{question}\"\n\
         User Answer: \"{user_answer}\"\n\
         Correct Answer: \"{correct_answer}\"\n\
         Please compare the user's answer to the correct answer, and provide a rating \
         (from 1 to 10) based on answer quality, and offer feedback for improvement.\n\
         Return the result in JSON format with the fields \"ratings\" (number) and \"feedback\" (string)."
    )
}

// =============================================================================
// PARSING
// =============================================================================

/// Slice from the first `open` to the last `close`, ignoring fences and labels around it.
fn extract_json(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}

/// Parse the generated question list.
///
/// # Errors
///
/// Returns `BadAiOutput` when no non-empty JSON array of `{question, answer}` is found.
pub fn parse_questions(raw: &str) -> Result<Vec<QuestionAnswer>, InterviewError> {
    let json = extract_json(raw, '[', ']').ok_or_else(|| InterviewError::BadAiOutput("no JSON array in response".into()))?;
    let questions: Vec<QuestionAnswer> =
        serde_json::from_str(json).map_err(|e| InterviewError::BadAiOutput(e.to_string()))?;

    let questions: Vec<QuestionAnswer> = questions
        .into_iter()
        .filter(|q| !q.question.trim().is_empty())
        .collect();
    if questions.is_empty() {
        return Err(InterviewError::BadAiOutput("empty question list".into()));
    }
    Ok(questions)
}

#[derive(Deserialize)]
struct RawFeedback {
    ratings: serde_json::Value,
    #[serde(default)]
    feedback: String,
}

/// Parse `{"ratings": number, "feedback": string}`. Ratings are clamped to 0..=10.
///
/// # Errors
///
/// Returns `BadAiOutput` when no JSON object is found or the rating is not numeric.
pub fn parse_feedback(raw: &str) -> Result<Feedback, InterviewError> {
    let json = extract_json(raw, '{', '}').ok_or_else(|| InterviewError::BadAiOutput("no JSON object in response".into()))?;
    let parsed: RawFeedback = serde_json::from_str(json).map_err(|e| InterviewError::BadAiOutput(e.to_string()))?;

    let rating = match &parsed.ratings {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|r| r.is_finite())
    .ok_or_else(|| InterviewError::BadAiOutput(format!("rating is not a number: {}", parsed.ratings)))?;

    Ok(Feedback { rating: rating.clamp(0.0, MAX_RATING), feedback: parsed.feedback.trim().to_string() })
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Ask the AI collaborator for interview questions.
///
/// # Errors
///
/// Returns `AiUnavailable` without a client, `Ai` on request failure, or
/// `BadAiOutput` when the reply does not parse.
pub async fn generate_questions(llm: Option<&dyn LlmChat>, job: &JobInfo) -> Result<Vec<QuestionAnswer>, InterviewError> {
    let llm = llm.ok_or(InterviewError::AiUnavailable)?;
    let raw = llm.complete(&question_prompt(job)).await?;
    let questions = parse_questions(&raw).inspect_err(|e| warn!(error = %e, "unusable question output"))?;
    info!(count = questions.len(), position = %job.position, "generated interview questions");
    Ok(questions)
}

/// Validate an answer, get AI feedback, and store it. Returns the new answer id.
///
/// # Errors
///
/// Returns an `InterviewError` for a short answer, a question outside the
/// interview, a repeated answer, an unavailable or failing AI collaborator,
/// or a store write failure.
pub async fn record_answer(
    data: &DataService,
    llm: Option<&dyn LlmChat>,
    interview: &Interview,
    user_id: &str,
    question: &str,
    user_answer: &str,
) -> Result<String, InterviewError> {
    let user_answer = user_answer.trim();
    if user_answer.chars().count() < MIN_ANSWER_CHARS {
        return Err(InterviewError::AnswerTooShort);
    }

    let expected = interview
        .questions
        .iter()
        .find(|q| q.question == question)
        .ok_or(InterviewError::UnknownQuestion)?;

    let existing = data.get_user_answers(&interview.id).await;
    if existing.iter().any(|a| a.user_id == user_id && a.question == question) {
        return Err(InterviewError::AlreadyAnswered);
    }

    let llm = llm.ok_or(InterviewError::AiUnavailable)?;
    let raw = llm
        .complete(&feedback_prompt(question, &expected.answer, user_answer))
        .await?;
    let feedback = parse_feedback(&raw).inspect_err(|e| warn!(error = %e, "unusable feedback output"))?;

    let answer = NewUserAnswer {
        mock_id_ref: interview.id.clone(),
        question: question.to_string(),
        correct_ans: expected.answer.clone(),
        user_ans: user_answer.to_string(),
        feedback: feedback.feedback,
        rating: feedback.rating,
        user_id: user_id.to_string(),
    };
    Ok(data.save_user_answer(&answer).await?)
}

#[cfg(test)]
#[path = "interview_test.rs"]
mod tests;
