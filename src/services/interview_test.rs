use std::sync::Arc;

use super::*;
use crate::identity::mock::MOCK_USER_ID;
use crate::llm::LlmChat;
use crate::state::test_helpers::ScriptedLlm;
use crate::store::mock::MockStore;

const LONG_ANSWER: &str = "State is data owned by a component that triggers a re-render when it changes.";

fn job() -> JobInfo {
    JobInfo {
        position: "Backend Engineer".into(),
        description: "Build HTTP services".into(),
        experience: 4,
        tech_stack: "Rust, Postgres".into(),
    }
}

async fn seeded_interview(data: &DataService) -> Interview {
    data.get_interview("mock-interview-1").await.unwrap()
}

// =============================================================================
// VALIDATION
// =============================================================================

#[test]
fn job_validation_rejects_blank_fields() {
    assert!(job().validate().is_ok());
    let mut blank = job();
    blank.tech_stack = "  ".into();
    assert!(matches!(blank.validate(), Err(InterviewError::Invalid(msg)) if msg.contains("techStack")));
}

#[test]
fn job_validation_rejects_negative_experience() {
    let mut bad = job();
    bad.experience = -1;
    assert!(matches!(bad.validate(), Err(InterviewError::Invalid(_))));
}

#[test]
fn patch_validation() {
    assert!(validate_patch(&InterviewPatch::default()).is_err());
    assert!(validate_patch(&InterviewPatch { position: Some(String::new()), ..Default::default() }).is_err());
    assert!(validate_patch(&InterviewPatch { questions: Some(Vec::new()), ..Default::default() }).is_err());
    assert!(validate_patch(&InterviewPatch { experience: Some(6), ..Default::default() }).is_ok());
}

#[tokio::test]
async fn patched_job_overlays_patch_fields() {
    let data = DataService::new(Arc::new(MockStore::new(false)));
    let interview = seeded_interview(&data).await;
    let patch = InterviewPatch { position: Some("Staff Engineer".into()), ..Default::default() };
    let info = JobInfo::patched(&interview, &patch);
    assert_eq!(info.position, "Staff Engineer");
    assert_eq!(info.tech_stack, interview.tech_stack);
    assert_eq!(info.experience, 2);
}

// =============================================================================
// PROMPTS / PARSING
// =============================================================================

#[test]
fn question_prompt_mentions_job_fields() {
    let prompt = question_prompt(&job());
    assert!(prompt.contains("Backend Engineer"));
    assert!(prompt.contains("Build HTTP services"));
    assert!(prompt.contains("Years of Experience Required: 4"));
    assert!(prompt.contains("Rust, Postgres"));
    assert!(prompt.contains("5 technical"));
}

#[test]
fn feedback_prompt_mentions_all_parts() {
    let prompt = feedback_prompt("Q?", "correct", "mine");
    assert!(prompt.contains("Question: \"Q?\""));
    assert!(prompt.contains("User Answer: \"mine\""));
    assert!(prompt.contains("Correct Answer: \"correct\""));
    assert!(prompt.contains("\"ratings\""));
}

#[test]
fn parse_questions_strips_code_fence() {
    let raw = "```json\n[{\"question\":\"What is Rust?\",\"answer\":\"A language.\"}]\n```";
    let questions = parse_questions(raw).unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].question, "What is Rust?");
}

#[test]
fn parse_questions_rejects_garbage() {
    assert!(matches!(parse_questions("no json here"), Err(InterviewError::BadAiOutput(_))));
    assert!(matches!(parse_questions("[]"), Err(InterviewError::BadAiOutput(_))));
    assert!(matches!(parse_questions("[{\"q\": 1}]"), Err(InterviewError::BadAiOutput(_))));
}

#[test]
fn parse_feedback_reads_number_and_text() {
    let fb = parse_feedback("```json\n{\"ratings\": 8, \"feedback\": \" Solid. \"}\n```").unwrap();
    assert!((fb.rating - 8.0).abs() < f64::EPSILON);
    assert_eq!(fb.feedback, "Solid.");
}

#[test]
fn parse_feedback_accepts_string_rating_and_clamps() {
    let fb = parse_feedback(r#"{"ratings": "12", "feedback": "x"}"#).unwrap();
    assert!((fb.rating - 10.0).abs() < f64::EPSILON);
    assert!(parse_feedback(r#"{"ratings": "great", "feedback": "x"}"#).is_err());
}

// =============================================================================
// OPERATIONS
// =============================================================================

#[tokio::test]
async fn generate_questions_requires_ai() {
    assert!(matches!(generate_questions(None, &job()).await, Err(InterviewError::AiUnavailable)));
}

#[tokio::test]
async fn generate_questions_uses_prompt_and_parses() {
    let llm = ScriptedLlm::replying(r#"[{"question":"Borrowing?","answer":"References."}]"#);
    let questions = generate_questions(Some(&llm as &dyn LlmChat), &job()).await.unwrap();
    assert_eq!(questions[0].answer, "References.");
    let prompts = llm.prompts.lock().unwrap();
    assert!(prompts[0].contains("Backend Engineer"));
}

#[tokio::test]
async fn generate_questions_propagates_llm_error() {
    let llm = ScriptedLlm::new(vec![Err(LlmError::ApiRequest("down".into()))]);
    assert!(matches!(generate_questions(Some(&llm as &dyn LlmChat), &job()).await, Err(InterviewError::Ai(_))));
}

#[tokio::test]
async fn record_answer_rejects_short_answer() {
    let data = DataService::new(Arc::new(MockStore::new(true)));
    let interview = seeded_interview(&data).await;
    let question = interview.questions[1].question.clone();
    let err = record_answer(&data, None, &interview, MOCK_USER_ID, &question, "   too short   ").await.unwrap_err();
    assert!(matches!(err, InterviewError::AnswerTooShort));
}

#[tokio::test]
async fn record_answer_rejects_unknown_question() {
    let data = DataService::new(Arc::new(MockStore::new(true)));
    let interview = seeded_interview(&data).await;
    let err = record_answer(&data, None, &interview, MOCK_USER_ID, "Not asked?", LONG_ANSWER).await.unwrap_err();
    assert!(matches!(err, InterviewError::UnknownQuestion));
}

#[tokio::test]
async fn record_answer_rejects_repeat() {
    let data = DataService::new(Arc::new(MockStore::new(true)));
    let interview = seeded_interview(&data).await;
    let question = interview.questions[0].question.clone();
    let err = record_answer(&data, None, &interview, MOCK_USER_ID, &question, LONG_ANSWER).await.unwrap_err();
    assert!(matches!(err, InterviewError::AlreadyAnswered));
}

#[tokio::test]
async fn record_answer_requires_ai() {
    let data = DataService::new(Arc::new(MockStore::new(true)));
    let interview = seeded_interview(&data).await;
    let question = interview.questions[1].question.clone();
    let err = record_answer(&data, None, &interview, MOCK_USER_ID, &question, LONG_ANSWER).await.unwrap_err();
    assert!(matches!(err, InterviewError::AiUnavailable));
}

#[tokio::test]
async fn record_answer_stores_feedback() {
    let data = DataService::new(Arc::new(MockStore::new(true)));
    let interview = seeded_interview(&data).await;
    let question = interview.questions[1].question.clone();
    let llm = ScriptedLlm::replying(r#"{"ratings": 6, "feedback": "Mention setState batching."}"#);

    let id = record_answer(&data, Some(&llm as &dyn LlmChat), &interview, MOCK_USER_ID, &question, LONG_ANSWER)
        .await
        .unwrap();
    assert!(id.starts_with("mock-answer-"));

    let answers = data.get_user_answers(&interview.id).await;
    let saved = answers.iter().find(|a| a.id == id).unwrap();
    assert_eq!(saved.question, question);
    assert_eq!(saved.correct_ans, interview.questions[1].answer);
    assert_eq!(saved.user_ans, LONG_ANSWER);
    assert_eq!(saved.feedback, "Mention setState batching.");
    assert!((saved.rating - 6.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn record_answer_bad_feedback_is_not_stored() {
    let data = DataService::new(Arc::new(MockStore::new(true)));
    let interview = seeded_interview(&data).await;
    let question = interview.questions[2].question.clone();
    let llm = ScriptedLlm::replying("I'd rate it highly!");

    let err = record_answer(&data, Some(&llm as &dyn LlmChat), &interview, MOCK_USER_ID, &question, LONG_ANSWER)
        .await
        .unwrap_err();
    assert!(matches!(err, InterviewError::BadAiOutput(_)));
    assert_eq!(data.get_user_answers(&interview.id).await.len(), 1);
}
