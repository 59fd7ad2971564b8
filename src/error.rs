//! Error types
//!
//! Only selector strings can fail: everything else reports absence with
//! `None` or turns into a no-op.

/// Errors raised while compiling a selector
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("unsupported selector '{selector}': {feature} is not implemented")]
    UnsupportedSelector { selector: String, feature: String },
}

impl Error {
    pub(crate) fn invalid(selector: &str, reason: impl Into<String>) -> Self {
        Error::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(selector: &str, feature: impl Into<String>) -> Self {
        Error::UnsupportedSelector {
            selector: selector.to_string(),
            feature: feature.into(),
        }
    }

    /// The selector string that failed
    pub fn selector(&self) -> &str {
        match self {
            Error::InvalidSelector { selector, .. } | Error::UnsupportedSelector { selector, .. } => {
                selector
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
