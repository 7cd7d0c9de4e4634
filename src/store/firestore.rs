//! Firestore REST client.
//!
//! Reads use `GET documents/{collection}/{id}` and `documents:runQuery`;
//! every write goes through `documents:commit` so the server can stamp
//! `createdAt` / `updatedAt` with its own request time. Request bodies are
//! built by pure functions (`set_write`, `create_write`, `update_write`,
//! `equality_query`) for testability.

use rand::Rng;
use rand::distr::Alphanumeric;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use tracing::warn;

use super::value::{decode_fields, record_fields};
use super::{DataStore, StoreError, StoreMode};
use crate::config::StoreConfig;
use crate::model::{Interview, InterviewPatch, NewInterview, NewUser, NewUserAnswer, User, UserAnswer};

pub const USERS: &str = "users";
pub const INTERVIEWS: &str = "interviews";
pub const USER_ANSWERS: &str = "userAnswers";

const CREATED_AT: &str = "createdAt";
const UPDATED_AT: &str = "updatedAt";
/// Misspelled key written by older clients.
const LEGACY_UPDATED_AT: &str = "updateAt";
const DOCUMENT_ID_LEN: usize = 20;

// =============================================================================
// CLIENT
// =============================================================================

pub struct FirestoreStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    /// `projects/{project}/databases/{database}`
    database_path: String,
}

impl FirestoreStore {
    /// # Errors
    ///
    /// Returns an error if the API key or project id is missing, or the HTTP client fails to build.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let api_key = config.api_key.clone().ok_or(StoreError::MissingConfig("FIREBASE_API_KEY"))?;
        let project_id = config
            .project_id
            .clone()
            .filter(|p| !p.trim().is_empty())
            .ok_or(StoreError::MissingConfig("FIREBASE_PROJECT_ID"))?;
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.request())
            .connect_timeout(config.timeouts.connect())
            .build()
            .map_err(|e| StoreError::HttpClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key,
            database_path: format!("projects/{project_id}/databases/{}", config.database_id),
        })
    }

    /// Full resource name of a document.
    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/documents/{collection}/{id}", self.database_path)
    }

    fn documents_url(&self, suffix: &str) -> String {
        format!("{}/{}/documents{suffix}", self.base_url, self.database_path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<(u16, String), StoreError> {
        let response = request
            .query(&[("key", &self.api_key)])
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;
        Ok((status, text))
    }

    async fn get_document<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>, StoreError> {
        if !is_valid_document_id(id) {
            return Ok(None);
        }
        let url = format!("{}/{}", self.base_url, self.document_name(collection, id));
        let (status, body) = self.send(self.http.get(url)).await?;
        match status {
            200 => {
                let doc: Value = serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
                document_to_record(&doc).map(Some)
            }
            404 => Ok(None),
            _ => Err(StoreError::Response { status, body }),
        }
    }

    async fn query_equal<T: DeserializeOwned>(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<T>, StoreError> {
        let request = self
            .http
            .post(self.documents_url(":runQuery"))
            .json(&equality_query(collection, field, value));
        let (status, body) = self.send(request).await?;
        if status != 200 {
            return Err(StoreError::Response { status, body });
        }
        parse_query_response(&body)
    }

    async fn commit(&self, write: Value, id: &str) -> Result<(), StoreError> {
        let request = self
            .http
            .post(self.documents_url(":commit"))
            .json(&json!({ "writes": [write] }));
        let (status, body) = self.send(request).await?;
        match status {
            200 => Ok(()),
            404 => Err(StoreError::NotFound(id.to_string())),
            _ => Err(StoreError::Response { status, body }),
        }
    }

    async fn create<T: serde::Serialize>(&self, collection: &str, record: &T) -> Result<String, StoreError> {
        let id = new_document_id();
        let write = create_write(&self.document_name(collection, &id), record_fields(record)?);
        self.commit(write, &id).await?;
        Ok(id)
    }
}

#[async_trait::async_trait]
impl DataStore for FirestoreStore {
    fn mode(&self) -> StoreMode {
        StoreMode::Firestore
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        self.get_document(USERS, user_id).await
    }

    async fn set_user(&self, user_id: &str, user: &NewUser) -> Result<(), StoreError> {
        if !is_valid_document_id(user_id) {
            return Err(StoreError::NotFound(user_id.to_string()));
        }
        let write = set_write(&self.document_name(USERS, user_id), record_fields(user)?);
        self.commit(write, user_id).await
    }

    async fn get_user_interviews(&self, user_id: &str) -> Result<Vec<Interview>, StoreError> {
        self.query_equal(INTERVIEWS, "userId", user_id).await
    }

    async fn get_interview(&self, interview_id: &str) -> Result<Option<Interview>, StoreError> {
        self.get_document(INTERVIEWS, interview_id).await
    }

    async fn create_interview(&self, interview: &NewInterview) -> Result<String, StoreError> {
        self.create(INTERVIEWS, interview).await
    }

    async fn update_interview(&self, interview_id: &str, patch: &InterviewPatch) -> Result<(), StoreError> {
        if !is_valid_document_id(interview_id) {
            return Err(StoreError::NotFound(interview_id.to_string()));
        }
        let write = update_write(
            &self.document_name(INTERVIEWS, interview_id),
            record_fields(patch)?,
            &patch.field_paths(),
        );
        self.commit(write, interview_id).await
    }

    async fn get_user_answers(&self, interview_id: &str) -> Result<Vec<UserAnswer>, StoreError> {
        self.query_equal(USER_ANSWERS, "mockIdRef", interview_id).await
    }

    async fn save_user_answer(&self, answer: &NewUserAnswer) -> Result<String, StoreError> {
        self.create(USER_ANSWERS, answer).await
    }
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

fn server_time(field: &str) -> Value {
    json!({ "fieldPath": field, "setToServerValue": "REQUEST_TIME" })
}

/// Full overwrite, stamping both timestamps.
pub(crate) fn set_write(name: &str, fields: Map<String, Value>) -> Value {
    json!({
        "update": { "name": name, "fields": fields },
        "updateTransforms": [server_time(CREATED_AT), server_time(UPDATED_AT)],
    })
}

/// Insert that fails if the document already exists.
pub(crate) fn create_write(name: &str, fields: Map<String, Value>) -> Value {
    let mut write = set_write(name, fields);
    write["currentDocument"] = json!({ "exists": false });
    write
}

/// Masked update of an existing document, stamping `updatedAt`.
pub(crate) fn update_write(name: &str, fields: Map<String, Value>, field_paths: &[&str]) -> Value {
    json!({
        "update": { "name": name, "fields": fields },
        "updateMask": { "fieldPaths": field_paths },
        "updateTransforms": [server_time(UPDATED_AT)],
        "currentDocument": { "exists": true },
    })
}

pub(crate) fn equality_query(collection: &str, field: &str, value: &str) -> Value {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "where": {
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": { "stringValue": value },
                }
            }
        }
    })
}

// =============================================================================
// PARSING
// =============================================================================

/// Decode a document into a record, taking `id` from the last segment of its name.
pub(crate) fn document_to_record<T: DeserializeOwned>(doc: &Value) -> Result<T, StoreError> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode("document without name".into()))?;
    let id = name.rsplit('/').next().unwrap_or(name);

    let mut record = match doc.get("fields").and_then(Value::as_object) {
        Some(fields) => decode_fields(fields)?,
        None => Map::new(),
    };
    normalize_updated_at(&mut record);
    record.insert("id".into(), Value::String(id.to_string()));

    serde_json::from_value(Value::Object(record)).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Fold the legacy key into `updatedAt`, falling back to `createdAt`.
/// Documents patched after a legacy write carry both keys; `updatedAt` wins.
fn normalize_updated_at(record: &mut Map<String, Value>) {
    let legacy = record.remove(LEGACY_UPDATED_AT);
    if record.contains_key(UPDATED_AT) {
        return;
    }
    if let Some(value) = legacy.or_else(|| record.get(CREATED_AT).cloned()) {
        record.insert(UPDATED_AT.into(), value);
    }
}

/// `runQuery` streams one element per match plus a trailing read-time marker.
/// Documents that fail to decode are logged and skipped.
pub(crate) fn parse_query_response<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, StoreError> {
    let items: Vec<Value> = serde_json::from_str(body).map_err(|e| StoreError::Decode(e.to_string()))?;
    Ok(items
        .iter()
        .filter_map(|item| item.get("document"))
        .filter_map(|doc| match document_to_record(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                let name = doc.get("name").and_then(Value::as_str).unwrap_or("<unnamed>");
                warn!(document = %name, error = %e, "skipping undecodable document");
                None
            }
        })
        .collect())
}

pub(crate) fn is_valid_document_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 1500 && id != "." && id != ".." && !id.contains('/') && !id.starts_with("__")
}

/// Random 20-character alphanumeric id, the same shape client SDKs generate.
pub(crate) fn new_document_id() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[path = "firestore_test.rs"]
mod tests;
