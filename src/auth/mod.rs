//! Authorization for the admin surface.
//!
//! Admin identity is a bare numeric chat-user id checked against a static
//! allow-list. A real credential scheme can replace `AdminRegistry` without
//! touching service logic.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{AppError, AppResult};

/// Fixed allow-list of admin ids.
#[derive(Clone)]
pub struct AdminRegistry {
    ids: Arc<HashSet<i64>>,
}

impl AdminRegistry {
    /// Build the registry from the configured id list.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: Arc::new(ids.into_iter().collect()),
        }
    }

    /// Check whether an id is on the allow-list.
    pub fn is_admin(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Authorize an admin operation, failing with `Forbidden` otherwise.
    pub fn authorize(&self, id: i64) -> AppResult<()> {
        if self.is_admin(id) {
            Ok(())
        } else {
            Err(AppError::Forbidden("admin access required".to_string()))
        }
    }
}

impl std::fmt::Debug for AdminRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdminRegistry({} ids)", self.ids.len())
    }
}
