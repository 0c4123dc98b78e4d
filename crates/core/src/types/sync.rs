//! The uniform result envelope returned by every sync gateway operation.

use serde::{Deserialize, Serialize};

/// Success/data/error envelope.
///
/// Exactly one of `data` (on success) or `error` (on failure) is meaningful;
/// `success` is always consistent with which is present. The constructors
/// are the only way to build a value, so the invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> SyncResult<T> {
    /// A successful result carrying data.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed result carrying an error message.
    #[must_use]
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }

    /// The data, consuming the envelope. `None` when the result failed.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Map the data while keeping success/error intact.
    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> SyncResult<U> {
        SyncResult {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
        }
    }
}
