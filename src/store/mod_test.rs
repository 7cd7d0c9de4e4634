use super::*;
use crate::identity::mock::MOCK_USER_ID;
use crate::model::QuestionAnswer;

/// Backend whose every call fails, for exercising the façade policy.
struct FailingStore;

fn boom() -> StoreError {
    StoreError::Response { status: 503, body: "unavailable".into() }
}

#[async_trait::async_trait]
impl DataStore for FailingStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Firestore
    }
    async fn get_user(&self, _: &str) -> Result<Option<User>, StoreError> {
        Err(boom())
    }
    async fn set_user(&self, _: &str, _: &NewUser) -> Result<(), StoreError> {
        Err(boom())
    }
    async fn get_user_interviews(&self, _: &str) -> Result<Vec<Interview>, StoreError> {
        Err(boom())
    }
    async fn get_interview(&self, _: &str) -> Result<Option<Interview>, StoreError> {
        Err(boom())
    }
    async fn create_interview(&self, _: &NewInterview) -> Result<String, StoreError> {
        Err(boom())
    }
    async fn update_interview(&self, _: &str, _: &InterviewPatch) -> Result<(), StoreError> {
        Err(boom())
    }
    async fn get_user_answers(&self, _: &str) -> Result<Vec<UserAnswer>, StoreError> {
        Err(boom())
    }
    async fn save_user_answer(&self, _: &NewUserAnswer) -> Result<String, StoreError> {
        Err(boom())
    }
}

fn failing() -> DataService {
    DataService::new(Arc::new(FailingStore))
}

fn new_interview() -> NewInterview {
    NewInterview {
        position: "p".into(),
        description: "d".into(),
        experience: 1,
        user_id: "u".into(),
        tech_stack: "t".into(),
        questions: vec![QuestionAnswer { question: "q".into(), answer: "a".into() }],
    }
}

// =============================================================================
// select_mode / from_config
// =============================================================================

#[test]
fn absent_or_sentinel_key_selects_mock() {
    assert_eq!(select_mode(None), StoreMode::Mock);
    assert_eq!(select_mode(Some(MOCK_STORE_SENTINEL)), StoreMode::Mock);
    assert_eq!(select_mode(Some("AIzaLive")), StoreMode::Firestore);
}

#[test]
fn from_config_defaults_to_mock() {
    assert_eq!(DataService::from_config(&StoreConfig::default()).mode(), StoreMode::Mock);
}

#[test]
fn from_config_falls_back_without_project() {
    let config = StoreConfig { api_key: Some("AIzaLive".into()), ..StoreConfig::default() };
    assert_eq!(DataService::from_config(&config).mode(), StoreMode::Mock);
}

#[test]
fn from_config_uses_firestore_when_complete() {
    let config =
        StoreConfig { api_key: Some("AIzaLive".into()), project_id: Some("proj".into()), ..StoreConfig::default() };
    assert_eq!(DataService::from_config(&config).mode(), StoreMode::Firestore);
}

// =============================================================================
// error policy: reads degrade
// =============================================================================

#[tokio::test]
async fn failed_reads_degrade_to_empty() {
    let data = failing();
    assert!(data.get_user("u").await.is_none());
    assert!(data.get_interview("i").await.is_none());
    assert!(data.get_user_interviews("u").await.is_empty());
    assert!(data.get_user_answers("i").await.is_empty());
}

// =============================================================================
// error policy: writes propagate
// =============================================================================

#[tokio::test]
async fn failed_writes_propagate() {
    let data = failing();
    let user = NewUser { name: "n".into(), email: "e".into(), image_url: String::new() };
    assert!(matches!(data.set_user("u", &user).await, Err(StoreError::Response { status: 503, .. })));
    assert!(data.create_interview(&new_interview()).await.is_err());
    assert!(data.update_interview("i", &InterviewPatch::default()).await.is_err());

    let answer = NewUserAnswer {
        mock_id_ref: "i".into(),
        question: "q".into(),
        correct_ans: "a".into(),
        user_ans: "b".into(),
        feedback: "f".into(),
        rating: 1.0,
        user_id: "u".into(),
    };
    assert!(data.save_user_answer(&answer).await.is_err());
}

// =============================================================================
// happy path through the mock backend
// =============================================================================

#[tokio::test]
async fn facade_passes_through_mock_results() {
    let data = DataService::new(Arc::new(mock::MockStore::new(false)));
    assert_eq!(data.mode(), StoreMode::Mock);
    assert_eq!(data.get_user_interviews(MOCK_USER_ID).await.len(), 2);
    assert!(data.create_interview(&new_interview()).await.unwrap().starts_with("mock-interview-"));
}

#[test]
fn store_error_display() {
    assert!(StoreError::NotFound("abc".into()).to_string().contains("abc"));
    assert!(boom().to_string().contains("503"));
}
