//! Core types for spark-compose.
//!
//! These types are shared by every layer: the validator, the builder and the
//! runtime all talk about components through their [`Uid`].

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use serde::Serialize;

// =============================================================================
// Uid
// =============================================================================

/// Unique component identifier.
///
/// A uid is unique within its [`System`](crate::system::System) for the whole
/// lifetime of that system. Once a component is deregistered its uid is
/// retired and never handed out again.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Uid(String);

impl Uid {
    /// Wrap an author-supplied identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive the uid of a named part owned by this uid.
    pub fn part(&self, part: &str) -> Self {
        Self(format!("{}-{}", self.0, part))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deref for Uid {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Uid {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Uid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Uid {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Uid {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

/// Component lifecycle.
///
/// `Unbuilt -> Registered -> Active -> Deregistered`. Deregistration is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Constructed but not yet visible through the system registry.
    #[default]
    Unbuilt,
    /// Reachable through `System::get_by_uid`.
    Registered,
    /// Mounted into a live tree.
    Active,
    /// Removed from the system. Terminal.
    Deregistered,
}

impl Lifecycle {
    /// Whether the component can still be reached through its system.
    pub fn is_live(self) -> bool {
        matches!(self, Lifecycle::Registered | Lifecycle::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_uid() {
        let uid = Uid::new("tabbar_3");
        assert_eq!(uid.part("tabs").as_str(), "tabbar_3-tabs");
    }

    #[test]
    fn test_lifecycle_liveness() {
        assert!(!Lifecycle::Unbuilt.is_live());
        assert!(Lifecycle::Registered.is_live());
        assert!(Lifecycle::Active.is_live());
        assert!(!Lifecycle::Deregistered.is_live());
    }
}
