use thiserror::Error;

/// Errors that can occur while serializing audit entries.
///
/// Missing permissions are never reported here: a serializer that is not
/// allowed to show a field simply leaves it out of the document.
#[derive(Debug, Error)]
pub enum Error {
    /// Neither a built-in serializer nor any registered fallback could
    /// represent the entry.
    #[error("no serializer available for audit entry '{entry_id}'")]
    NoMatchingSerializer {
        /// Identifier of the entry that could not be represented
        entry_id: String,
    },

    /// A JSON value does not have the shape of a serialized audit document.
    #[error("malformed audit document: {reason}")]
    MalformedDocument {
        /// What is wrong with the value
        reason: String,
    },

    /// Wire encoding of a finished document failed.
    #[error("audit document encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl Error {
    /// Creates a `NoMatchingSerializer` error for the given entry.
    pub fn no_match(entry_id: impl Into<String>) -> Self {
        Error::NoMatchingSerializer {
            entry_id: entry_id.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Error::MalformedDocument {
            reason: reason.into(),
        }
    }

    /// Returns `true` if the entry simply has no serializer.
    ///
    /// Callers listing audit entries typically skip these rather than
    /// aborting the whole listing.
    pub fn is_no_match(&self) -> bool {
        matches!(self, Error::NoMatchingSerializer { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
