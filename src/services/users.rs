//! User records: created lazily from the identity profile.
//!
//! ERROR HANDLING
//! ==============
//! `ensure_user` never fails the caller. Store errors are logged and the
//! request carries on with whatever the identity provider reported.

use tracing::{error, info};

use crate::identity::UserRecord;
use crate::model::NewUser;
use crate::store::DataService;

const FALLBACK_NAME: &str = "Anonymous";
const FALLBACK_EMAIL: &str = "N/A";

/// Stored profile derived from an identity record.
#[must_use]
pub fn profile_from_identity(user: &UserRecord) -> NewUser {
    let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.trim().is_empty()).map(str::to_string);

    NewUser {
        name: non_empty(&user.full_name)
            .or_else(|| non_empty(&user.first_name))
            .unwrap_or_else(|| FALLBACK_NAME.to_string()),
        email: non_empty(&user.primary_email).unwrap_or_else(|| FALLBACK_EMAIL.to_string()),
        image_url: user.image_url.clone().unwrap_or_default(),
    }
}

/// Create the stored user record if it does not exist yet.
///
/// Returns `true` when a record was written.
pub async fn ensure_user(data: &DataService, user: &UserRecord) -> bool {
    if data.get_user(&user.id).await.is_some() {
        return false;
    }

    let profile = profile_from_identity(user);
    match data.set_user(&user.id, &profile).await {
        Ok(()) => {
            info!(user_id = %user.id, "created user record");
            true
        }
        Err(e) => {
            error!(error = %e, user_id = %user.id, "failed to create user record");
            false
        }
    }
}

#[cfg(test)]
#[path = "users_test.rs"]
mod tests;
