//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! carries the two façades chosen at startup and the optional AI client.
//! Nothing in here changes after construction.

use std::sync::Arc;

use crate::identity::AuthFacade;
use crate::llm::LlmChat;
use crate::store::DataService;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthFacade,
    pub data: DataService,
    /// Optional LLM client. `None` if `GEMINI_API_KEY` is not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
}

impl AppState {
    #[must_use]
    pub fn new(auth: AuthFacade, data: DataService, llm: Option<Arc<dyn LlmChat>>) -> Self {
        Self { auth, data, llm }
    }

    /// Borrow the AI client, if configured.
    #[must_use]
    pub fn llm(&self) -> Option<&dyn LlmChat> {
        self.llm.as_deref()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
