//! `users` table access.

use model::{Role, User, UserUpdate};

use crate::error::BackendError;
use crate::rest::{Query, RestClient, stamp};

pub struct Users<'a> {
    pub(crate) rest: &'a RestClient,
}

impl Users<'_> {
    /// Read one account row by id.
    ///
    /// # Errors
    ///
    /// Returns the service's message when the row is missing or hidden.
    pub async fn get(&self, user_id: &str) -> Result<User, BackendError> {
        self.rest
            .fetch_one(Query::table("users").select("*").eq("id", user_id))
            .await
    }

    /// Patch the account row, stamping `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns the service's message when the update is refused.
    pub async fn update(&self, user_id: &str, updates: &UserUpdate) -> Result<User, BackendError> {
        self.rest
            .update_one(Query::table("users").eq("id", user_id), &stamp(updates))
            .await
    }

    /// Active accounts holding `role`.
    ///
    /// # Errors
    ///
    /// Returns the service's message on failure.
    pub async fn by_role(&self, role: Role) -> Result<Vec<User>, BackendError> {
        self.rest
            .fetch_many(
                Query::table("users")
                    .select("*")
                    .eq("role", role)
                    .eq("is_active", true),
            )
            .await
    }
}
