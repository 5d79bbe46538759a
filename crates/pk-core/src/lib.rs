//! Shared primitives used across PageKit crates.

use thiserror::Error;

/// Result alias used across the workspace.
pub type PageResult<T> = Result<T, PageError>;

/// Workspace error: a stable dotted code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct PageError {
    pub code: &'static str,
    pub message: String,
}

impl PageError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::new("config.invalid", message)
    }

    pub fn missing_element(code: &'static str, id: &str) -> Self {
        Self::new(code, format!("required element `#{id}` is not present"))
    }
}

#[cfg(test)]
mod tests {
    use super::PageError;

    #[test]
    fn display_joins_code_and_message() {
        let error = PageError::new("page.io", "failed to read index.html");
        assert_eq!(error.to_string(), "page.io: failed to read index.html");
    }

    #[test]
    fn missing_element_names_the_id() {
        let error = PageError::missing_element("captcha.missing_element", "captcha-input");
        assert_eq!(error.code, "captcha.missing_element");
        assert!(error.message.contains("#captcha-input"));
    }
}
