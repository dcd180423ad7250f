//! Resource accounting error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ResourceError {
    #[error("resource quota must be non-negative, got {quota}")]
    NegativeQuota { quota: i64 },
}

impl UserFacingError for ResourceError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NegativeQuota { .. } => {
                Some("Use a quota of zero or more, or an unbounded counter for no limit.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }
}
