//! Data access: users, interviews and recorded answers.
//!
//! DESIGN
//! ======
//! `DataStore` is implemented by the Firestore REST client (`firestore`) and
//! an in-process canned dataset (`mock`). `DataService` picks one at startup
//! and is the only thing route handlers talk to.
//!
//! ERROR HANDLING
//! ==============
//! The façade applies one policy to both backends: failed reads are logged
//! and degrade to `None` / an empty list, failed writes are logged and
//! returned to the caller so it can report the failure. The asymmetry is
//! intentional; a list page renders empty while a save shows an error.

pub mod firestore;
pub mod mock;
pub mod value;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::{MOCK_STORE_SENTINEL, StoreConfig, is_placeholder};
use crate::model::{Interview, InterviewPatch, NewInterview, NewUser, NewUserAnswer, User, UserAnswer};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("store request failed: {0}")]
    Request(String),
    #[error("store error: status {status}")]
    Response { status: u16, body: String },
    #[error("store response decode failed: {0}")]
    Decode(String),
    #[error("value codec: {0}")]
    Value(#[from] value::ValueError),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Mock,
    Firestore,
}

impl StoreMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Firestore => "firestore",
        }
    }
}

/// Backend contract. Both implementations return identical shapes.
#[async_trait::async_trait]
pub trait DataStore: Send + Sync {
    fn mode(&self) -> StoreMode;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;
    /// Create or overwrite a user profile.
    async fn set_user(&self, user_id: &str, user: &NewUser) -> Result<(), StoreError>;

    async fn get_user_interviews(&self, user_id: &str) -> Result<Vec<Interview>, StoreError>;
    async fn get_interview(&self, interview_id: &str) -> Result<Option<Interview>, StoreError>;
    /// Returns the new interview id.
    async fn create_interview(&self, interview: &NewInterview) -> Result<String, StoreError>;
    async fn update_interview(&self, interview_id: &str, patch: &InterviewPatch) -> Result<(), StoreError>;

    async fn get_user_answers(&self, interview_id: &str) -> Result<Vec<UserAnswer>, StoreError>;
    /// Returns the new answer id.
    async fn save_user_answer(&self, answer: &NewUserAnswer) -> Result<String, StoreError>;
}

/// Pick a backend from the configured database API key.
#[must_use]
pub fn select_mode(api_key: Option<&str>) -> StoreMode {
    if is_placeholder(api_key, MOCK_STORE_SENTINEL) { StoreMode::Mock } else { StoreMode::Firestore }
}

// =============================================================================
// FAÇADE
// =============================================================================

#[derive(Clone)]
pub struct DataService {
    store: Arc<dyn DataStore>,
}

impl DataService {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Select and build the backend for this process.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        match select_mode(config.api_key.as_deref()) {
            StoreMode::Mock => {
                warn!(persist_writes = config.mock_persist_writes, "database key absent or placeholder, using mock data store");
                Self::mock(config)
            }
            StoreMode::Firestore => match firestore::FirestoreStore::new(config) {
                Ok(store) => {
                    info!(project_id = ?config.project_id, "using firestore data store");
                    Self::new(Arc::new(store))
                }
                Err(e) => {
                    warn!(error = %e, "firestore unavailable, falling back to mock data store");
                    Self::mock(config)
                }
            },
        }
    }

    fn mock(config: &StoreConfig) -> Self {
        Self::new(Arc::new(mock::MockStore::new(config.mock_persist_writes)))
    }

    #[must_use]
    pub fn mode(&self) -> StoreMode {
        self.store.mode()
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub async fn get_user(&self, user_id: &str) -> Option<User> {
        self.store.get_user(user_id).await.unwrap_or_else(|e| {
            error!(error = %e, user_id, "get user failed");
            None
        })
    }

    /// # Errors
    ///
    /// Returns the backend error after logging it.
    pub async fn set_user(&self, user_id: &str, user: &NewUser) -> Result<(), StoreError> {
        self.store.set_user(user_id, user).await.inspect_err(|e| {
            error!(error = %e, user_id, "set user failed");
        })
    }

    // -------------------------------------------------------------------------
    // Interviews
    // -------------------------------------------------------------------------

    pub async fn get_user_interviews(&self, user_id: &str) -> Vec<Interview> {
        self.store.get_user_interviews(user_id).await.unwrap_or_else(|e| {
            error!(error = %e, user_id, "list interviews failed");
            Vec::new()
        })
    }

    pub async fn get_interview(&self, interview_id: &str) -> Option<Interview> {
        self.store.get_interview(interview_id).await.unwrap_or_else(|e| {
            error!(error = %e, interview_id, "get interview failed");
            None
        })
    }

    /// # Errors
    ///
    /// Returns the backend error after logging it.
    pub async fn create_interview(&self, interview: &NewInterview) -> Result<String, StoreError> {
        self.store.create_interview(interview).await.inspect_err(|e| {
            error!(error = %e, user_id = %interview.user_id, "create interview failed");
        })
    }

    /// # Errors
    ///
    /// Returns the backend error after logging it.
    pub async fn update_interview(&self, interview_id: &str, patch: &InterviewPatch) -> Result<(), StoreError> {
        self.store.update_interview(interview_id, patch).await.inspect_err(|e| {
            error!(error = %e, interview_id, "update interview failed");
        })
    }

    // -------------------------------------------------------------------------
    // Answers
    // -------------------------------------------------------------------------

    pub async fn get_user_answers(&self, interview_id: &str) -> Vec<UserAnswer> {
        self.store.get_user_answers(interview_id).await.unwrap_or_else(|e| {
            error!(error = %e, interview_id, "list answers failed");
            Vec::new()
        })
    }

    /// # Errors
    ///
    /// Returns the backend error after logging it.
    pub async fn save_user_answer(&self, answer: &NewUserAnswer) -> Result<String, StoreError> {
        self.store.save_user_answer(answer).await.inspect_err(|e| {
            error!(error = %e, interview_id = %answer.mock_id_ref, "save answer failed");
        })
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
