use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiers of whoever was active when a log entry was written.
///
/// Both identifiers are optional. A nil UUID counts as unset: `has_customer_id`
/// and `has_session_id` report `false` for `None` and for `Uuid::nil()` alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSenderDetails {
    customer_id: Option<Uuid>,
    session_id: Option<Uuid>,
}

impl LogSenderDetails {
    pub fn new(customer_id: Option<Uuid>, session_id: Option<Uuid>) -> Self {
        Self {
            customer_id,
            session_id,
        }
    }

    pub fn for_customer(customer_id: Uuid) -> Self {
        Self::new(Some(customer_id), None)
    }

    pub fn customer_id(&self) -> Option<Uuid> {
        self.customer_id
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn has_customer_id(&self) -> bool {
        self.customer_id.is_some_and(|id| !id.is_nil())
    }

    pub fn has_session_id(&self) -> bool {
        self.session_id.is_some_and(|id| !id.is_nil())
    }

    /// Customer id, filtered through the "nil counts as unset" policy.
    pub fn effective_customer_id(&self) -> Option<Uuid> {
        self.customer_id.filter(|id| !id.is_nil())
    }

    /// Session id, filtered through the "nil counts as unset" policy.
    pub fn effective_session_id(&self) -> Option<Uuid> {
        self.session_id.filter(|id| !id.is_nil())
    }
}
