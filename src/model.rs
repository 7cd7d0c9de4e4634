//! Plain records shared by both data store backends.
//!
//! Field names follow the stored document layout: camelCase, except the
//! answer's `correct_ans` / `user_ans` which were always stored verbatim.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// =============================================================================
// RECORDS
// =============================================================================

/// Stand-in for a timestamp the stored document never received.
fn unset_time() -> OffsetDateTime {
    OffsetDateTime::UNIX_EPOCH
}

/// Stored profile of a signed-in user. Created on first sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    #[serde(with = "time::serde::rfc3339", default = "unset_time")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339", alias = "updateAt", default = "unset_time")]
    pub updated_at: OffsetDateTime,
}

/// One generated question with its reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// A mock interview owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    pub id: String,
    pub position: String,
    pub description: String,
    pub experience: i64,
    /// Owner reference. Not enforced by the store.
    pub user_id: String,
    pub tech_stack: String,
    #[serde(default)]
    pub questions: Vec<QuestionAnswer>,
    #[serde(with = "time::serde::rfc3339", default = "unset_time")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339", alias = "updateAt", default = "unset_time")]
    pub updated_at: OffsetDateTime,
}

/// A recorded answer with the feedback it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnswer {
    pub id: String,
    /// Interview this answer belongs to.
    pub mock_id_ref: String,
    pub question: String,
    #[serde(rename = "correct_ans")]
    pub correct_ans: String,
    #[serde(rename = "user_ans")]
    pub user_ans: String,
    pub feedback: String,
    pub rating: f64,
    pub user_id: String,
    #[serde(with = "time::serde::rfc3339", default = "unset_time")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339", alias = "updateAt", default = "unset_time")]
    pub updated_at: OffsetDateTime,
}

// =============================================================================
// WRITE INPUTS
// =============================================================================

/// Profile fields written by `set_user`. Id and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInterview {
    pub position: String,
    pub description: String,
    pub experience: i64,
    pub user_id: String,
    pub tech_stack: String,
    #[serde(default)]
    pub questions: Vec<QuestionAnswer>,
}

/// Partial interview update. Only `Some` fields are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tech_stack: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<QuestionAnswer>>,
}

impl InterviewPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.position.is_none()
            && self.description.is_none()
            && self.experience.is_none()
            && self.tech_stack.is_none()
            && self.questions.is_none()
    }

    /// Stored field names touched by this patch, in declaration order.
    #[must_use]
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.position.is_some() {
            paths.push("position");
        }
        if self.description.is_some() {
            paths.push("description");
        }
        if self.experience.is_some() {
            paths.push("experience");
        }
        if self.tech_stack.is_some() {
            paths.push("techStack");
        }
        if self.questions.is_some() {
            paths.push("questions");
        }
        paths
    }

    /// Apply the patch in place, stamping `updated_at`.
    pub fn apply(&self, interview: &mut Interview, now: OffsetDateTime) {
        if let Some(position) = &self.position {
            interview.position.clone_from(position);
        }
        if let Some(description) = &self.description {
            interview.description.clone_from(description);
        }
        if let Some(experience) = self.experience {
            interview.experience = experience;
        }
        if let Some(tech_stack) = &self.tech_stack {
            interview.tech_stack.clone_from(tech_stack);
        }
        if let Some(questions) = &self.questions {
            interview.questions.clone_from(questions);
        }
        interview.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserAnswer {
    pub mock_id_ref: String,
    pub question: String,
    #[serde(rename = "correct_ans")]
    pub correct_ans: String,
    #[serde(rename = "user_ans")]
    pub user_ans: String,
    pub feedback: String,
    pub rating: f64,
    pub user_id: String,
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
