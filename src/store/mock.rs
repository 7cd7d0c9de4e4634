//! Mock data store: a fixed dataset for demos and tests.
//!
//! By default writes are logged and discarded: creations hand back a fresh
//! `<prefix>-<unix-millis>` id, but nothing is stored, so a created
//! interview never shows up in a later listing. Built with
//! `persist_writes = true` the store applies writes to its in-memory copy
//! instead.

use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::info;

use super::{DataStore, StoreError, StoreMode};
use crate::identity::mock::MOCK_USER_ID;
use crate::model::{Interview, InterviewPatch, NewInterview, NewUser, NewUserAnswer, QuestionAnswer, User, UserAnswer};

pub const INTERVIEW_ID_PREFIX: &str = "mock-interview";
pub const ANSWER_ID_PREFIX: &str = "mock-answer";

// =============================================================================
// DATASET
// =============================================================================

#[derive(Debug, Clone)]
pub struct MockDataset {
    pub users: Vec<User>,
    pub interviews: Vec<Interview>,
    pub answers: Vec<UserAnswer>,
}

const SEED_QUESTIONS: [(&str, &str); 5] = [
    (
        "What is React and how does it differ from other JavaScript frameworks?",
        "React is a JavaScript library for building user interfaces, particularly single-page applications. \
         Unlike frameworks like Angular, React focuses only on the view layer and uses a virtual DOM for \
         efficient rendering. It uses a component-based architecture and a unidirectional data flow, making \
         applications more predictable and easier to debug.",
    ),
    (
        "Explain the concept of state in React.",
        "State in React is an object that determines how a component renders and behaves. It's similar to \
         props but is private and fully controlled by the component. State can be changed using setState() \
         method, which triggers a re-render of the component. With the introduction of hooks, state can also \
         be managed using the useState hook in functional components.",
    ),
    (
        "What are React hooks and how do they improve React development?",
        "React hooks are functions that let you 'hook into' React state and lifecycle features from function \
         components. They were introduced in React 16.8 to allow developers to use state and other React \
         features without writing a class. Hooks like useState, useEffect, useContext, and useReducer make \
         code more reusable, help organize logic in components, and reduce the complexity of components.",
    ),
    (
        "Describe the virtual DOM and its benefits.",
        "The virtual DOM is a lightweight copy of the actual DOM in memory. When state changes in a React \
         component, React creates a new virtual DOM tree, compares it with the previous one (a process called \
         'diffing'), and then updates only the changed parts in the real DOM. This approach is more efficient \
         than directly manipulating the DOM, as DOM operations are expensive in terms of performance.",
    ),
    (
        "What is the significance of keys in React lists?",
        "Keys help React identify which items have changed, been added, or been removed in lists. They should \
         be given to elements inside an array to give them a stable identity. Keys should be unique among \
         siblings, but they don't need to be globally unique. Using index as keys is not recommended if the \
         order of items may change, as it can negatively impact performance and may cause issues with \
         component state.",
    ),
];

fn seed_questions() -> Vec<QuestionAnswer> {
    SEED_QUESTIONS
        .iter()
        .map(|(question, answer)| QuestionAnswer { question: (*question).to_string(), answer: (*answer).to_string() })
        .collect()
}

impl MockDataset {
    /// One user, two interviews, one recorded answer. Timestamps are `now`.
    #[must_use]
    pub fn seeded(now: OffsetDateTime) -> Self {
        let questions = seed_questions();

        let users = vec![User {
            id: MOCK_USER_ID.into(),
            name: "Development User".into(),
            email: "dev@example.com".into(),
            image_url: "https://via.placeholder.com/150".into(),
            created_at: now,
            updated_at: now,
        }];

        let interviews = vec![
            Interview {
                id: format!("{INTERVIEW_ID_PREFIX}-1"),
                position: "Frontend Developer".into(),
                description: "We are looking for a skilled Frontend Developer with experience in React, \
                              TypeScript, and modern web technologies."
                    .into(),
                experience: 2,
                user_id: MOCK_USER_ID.into(),
                tech_stack: "React, TypeScript, CSS, HTML".into(),
                questions: questions.clone(),
                created_at: now,
                updated_at: now,
            },
            Interview {
                id: format!("{INTERVIEW_ID_PREFIX}-2"),
                position: "Full Stack Developer".into(),
                description: "Seeking a Full Stack Developer with experience in React, Node.js, and database \
                              technologies."
                    .into(),
                experience: 3,
                user_id: MOCK_USER_ID.into(),
                tech_stack: "React, Node.js, MongoDB, Express".into(),
                questions: questions.clone(),
                created_at: now,
                updated_at: now,
            },
        ];

        let answers = vec![UserAnswer {
            id: format!("{ANSWER_ID_PREFIX}-1"),
            mock_id_ref: format!("{INTERVIEW_ID_PREFIX}-1"),
            question: questions[0].question.clone(),
            correct_ans: questions[0].answer.clone(),
            user_ans: "React is a JavaScript library for building user interfaces. It's maintained by Facebook \
                       and a community of developers. React allows developers to create large web applications \
                       that can change data without reloading the page."
                .into(),
            feedback: "Good explanation of what React is, but could have elaborated more on how it differs from \
                       other frameworks."
                .into(),
            rating: 7.0,
            user_id: MOCK_USER_ID.into(),
            created_at: now,
            updated_at: now,
        }];

        Self { users, interviews, answers }
    }
}

// =============================================================================
// STORE
// =============================================================================

pub struct MockStore {
    data: RwLock<MockDataset>,
    persist_writes: bool,
    last_id_millis: AtomicI64,
}

impl MockStore {
    #[must_use]
    pub fn new(persist_writes: bool) -> Self {
        Self::with_dataset(MockDataset::seeded(OffsetDateTime::now_utc()), persist_writes)
    }

    #[must_use]
    pub fn with_dataset(dataset: MockDataset, persist_writes: bool) -> Self {
        Self { data: RwLock::new(dataset), persist_writes, last_id_millis: AtomicI64::new(0) }
    }

    /// `<prefix>-<unix-millis>`, bumped past the previous id so two writes in
    /// the same millisecond never collide.
    fn next_id(&self, prefix: &str) -> String {
        let now = i64::try_from(OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX);
        let mut prev = self.last_id_millis.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .last_id_millis
                .compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return format!("{prefix}-{next}"),
                Err(actual) => prev = actual,
            }
        }
    }
}

#[async_trait::async_trait]
impl DataStore for MockStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Mock
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let data = self.data.read().await;
        Ok(data.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn set_user(&self, user_id: &str, user: &NewUser) -> Result<(), StoreError> {
        info!(user_id, name = %user.name, persisted = self.persist_writes, "mock: set user");
        if !self.persist_writes {
            return Ok(());
        }

        let now = OffsetDateTime::now_utc();
        let mut data = self.data.write().await;
        let record = User {
            id: user_id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            image_url: user.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        match data.users.iter_mut().find(|u| u.id == user_id) {
            Some(existing) => *existing = record,
            None => data.users.push(record),
        }
        Ok(())
    }

    async fn get_user_interviews(&self, user_id: &str) -> Result<Vec<Interview>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .interviews
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_interview(&self, interview_id: &str) -> Result<Option<Interview>, StoreError> {
        let data = self.data.read().await;
        Ok(data.interviews.iter().find(|i| i.id == interview_id).cloned())
    }

    async fn create_interview(&self, interview: &NewInterview) -> Result<String, StoreError> {
        let id = self.next_id(INTERVIEW_ID_PREFIX);
        info!(interview_id = %id, position = %interview.position, persisted = self.persist_writes, "mock: create interview");
        if self.persist_writes {
            let now = OffsetDateTime::now_utc();
            self.data.write().await.interviews.push(Interview {
                id: id.clone(),
                position: interview.position.clone(),
                description: interview.description.clone(),
                experience: interview.experience,
                user_id: interview.user_id.clone(),
                tech_stack: interview.tech_stack.clone(),
                questions: interview.questions.clone(),
                created_at: now,
                updated_at: now,
            });
        }
        Ok(id)
    }

    async fn update_interview(&self, interview_id: &str, patch: &InterviewPatch) -> Result<(), StoreError> {
        info!(interview_id, fields = ?patch.field_paths(), persisted = self.persist_writes, "mock: update interview");
        if !self.persist_writes {
            return Ok(());
        }

        let mut data = self.data.write().await;
        let interview = data
            .interviews
            .iter_mut()
            .find(|i| i.id == interview_id)
            .ok_or_else(|| StoreError::NotFound(interview_id.to_string()))?;
        patch.apply(interview, OffsetDateTime::now_utc());
        Ok(())
    }

    async fn get_user_answers(&self, interview_id: &str) -> Result<Vec<UserAnswer>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .answers
            .iter()
            .filter(|a| a.mock_id_ref == interview_id)
            .cloned()
            .collect())
    }

    async fn save_user_answer(&self, answer: &NewUserAnswer) -> Result<String, StoreError> {
        let id = self.next_id(ANSWER_ID_PREFIX);
        info!(answer_id = %id, interview_id = %answer.mock_id_ref, persisted = self.persist_writes, "mock: save answer");
        if self.persist_writes {
            let now = OffsetDateTime::now_utc();
            self.data.write().await.answers.push(UserAnswer {
                id: id.clone(),
                mock_id_ref: answer.mock_id_ref.clone(),
                question: answer.question.clone(),
                correct_ans: answer.correct_ans.clone(),
                user_ans: answer.user_ans.clone(),
                feedback: answer.feedback.clone(),
                rating: answer.rating,
                user_id: answer.user_id.clone(),
                created_at: now,
                updated_at: now,
            });
        }
        Ok(id)
    }
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
