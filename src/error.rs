//! Error types for validation, building and coupling.
//!
//! Validation failures are values: they aggregate and are returned, never
//! thrown. Build errors wrap them and add the defects that come from the
//! toolkit's own definitions (conflicting exhibits, duplicate behaviours).

use std::fmt;

use thiserror::Error;

use crate::types::Uid;

// =============================================================================
// Validation
// =============================================================================

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct ValidationError {
    /// Dotted field path, e.g. `toggling.toggleClass` or `tabs[2].value`.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Qualify the path with a parent field.
    pub fn prefixed(self, prefix: &str) -> Self {
        let path = if prefix.is_empty() {
            self.path
        } else if self.path.is_empty() {
            prefix.to_string()
        } else if self.path.starts_with('[') {
            format!("{prefix}{}", self.path)
        } else {
            format!("{prefix}.{}", self.path)
        };
        Self {
            path,
            message: self.message,
        }
    }
}

/// Ordered, non-empty list of validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Returns `None` for an empty list: an empty failure is not a failure.
    pub fn from_vec(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![ValidationError::new(path, message)],
        }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    pub fn paths(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.errors
    }

    pub fn prefixed(self, prefix: &str) -> Self {
        Self {
            errors: self.errors.into_iter().map(|e| e.prefixed(prefix)).collect(),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(error: ValidationError) -> Self {
        Self { errors: vec![error] }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

// =============================================================================
// Build
// =============================================================================

/// Errors that abort a build. Nothing is registered when one is returned.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("invalid {kind} spec: {errors}")]
    Validation {
        kind: String,
        errors: ValidationErrors,
    },

    #[error("unknown behaviour '{0}'")]
    UnknownBehaviour(String),

    #[error("behaviour '{0}' is composed more than once")]
    DuplicateBehaviour(String),

    #[error("behaviours '{first}' and '{second}' contribute conflicting values for '{key}'")]
    ExhibitConflict {
        key: String,
        first: String,
        second: String,
    },

    #[error("placeholder '{0}' does not match any declared part")]
    UnknownPlaceholder(String),

    #[error("uid '{0}' is already in use")]
    DuplicateUid(Uid),

    #[error("detail field '{field}' is not {expected}")]
    Detail {
        field: String,
        expected: &'static str,
    },

    #[error("the owning system has been torn down")]
    SystemGone,
}

impl BuildError {
    pub fn validation(kind: impl Into<String>, errors: ValidationErrors) -> Self {
        BuildError::Validation {
            kind: kind.into(),
            errors,
        }
    }

    /// Validation failures carried by this error, if any.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            BuildError::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }
}

// =============================================================================
// Coupling
// =============================================================================

/// Errors resolving a coupled sibling.
#[derive(Debug, Clone, Error)]
pub enum CouplingError {
    #[error("component '{0}' has no coupling behaviour")]
    NotConfigured(Uid),

    #[error("no coupling named '{name}' on component '{owner}'")]
    UnknownName { owner: Uid, name: String },

    #[error("component '{0}' is no longer registered")]
    Deregistered(Uid),

    #[error(transparent)]
    Build(#[from] BuildError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_paths() {
        let error = ValidationError::new("toggleClass", "is required");
        assert_eq!(error.prefixed("toggling").path, "toggling.toggleClass");

        let error = ValidationError::new("[2].value", "is required");
        assert_eq!(error.prefixed("tabs").path, "tabs[2].value");

        let error = ValidationError::new("", "must be an object");
        assert_eq!(error.prefixed("keying").path, "keying");
    }

    #[test]
    fn test_empty_list_is_not_a_failure() {
        assert!(ValidationErrors::from_vec(Vec::new()).is_none());
        let errors = ValidationErrors::from_vec(vec![ValidationError::new("a", "x")]).unwrap();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_display_joins_failures() {
        let errors = ValidationErrors::from_vec(vec![
            ValidationError::new("dom", "is required"),
            ValidationError::new("tabs", "is required"),
        ])
        .unwrap();
        assert_eq!(errors.to_string(), "dom: is required; tabs: is required");
    }
}
