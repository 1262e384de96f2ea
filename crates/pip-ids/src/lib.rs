//! Shared identifiers for tasks, containers, surfaces and transitions.
#![warn(missing_docs)]
#![warn(unsafe_op_in_unsafe_fn)]

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a task as assigned by the window manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(i32);

impl TaskId {
    /// Wrap a raw task id.
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    /// Raw task id.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task#{}", self.0)
    }
}

/// Opaque token naming a window container in the hierarchy.
///
/// Tokens are compared by identity only. A task in picture-in-picture is
/// addressed by its token in every hierarchy transaction, while a child
/// activity hosted inside the task carries the task token as its last parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerToken(u64);

impl ContainerToken {
    /// Wrap a raw token value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw token value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContainerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wc#{:x}", self.0)
    }
}

/// Handle to a drawable surface (a "leash") that can be positioned and
/// transformed without the owning window observing the transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(u64);

impl SurfaceId {
    /// Wrap a raw surface handle.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw surface handle.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Identity of the app component that owns a task's top activity.
///
/// Used to decide whether a saved re-entry position still applies: entering
/// picture-in-picture from a different component invalidates it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId {
    /// Application package.
    package: String,
    /// Activity class within the package.
    class: String,
}

impl ComponentId {
    /// Construct a component identity from package and class names.
    #[must_use]
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            class: class.into(),
        }
    }

    /// Application package.
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Activity class name.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.package, self.class)
    }
}

/// Identifier for a display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayId(u32);

impl DisplayId {
    /// The built-in default display.
    pub const DEFAULT: Self = Self(0);

    /// Wrap a raw display id.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw display id.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Handle returned by the transition manager for a submitted transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionHandle(u64);

impl TransitionHandle {
    /// Wrap a raw handle value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw handle value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransitionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transition#{}", self.0)
    }
}

impl From<u64> for TransitionHandle {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<TransitionHandle> for u64 {
    fn from(value: TransitionHandle) -> Self {
        value.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_display_joins_package_and_class() {
        let c = ComponentId::new("com.example.video", "PlayerActivity");
        assert_eq!(c.to_string(), "com.example.video/PlayerActivity");
        assert_eq!(c.package(), "com.example.video");
    }

    #[test]
    fn handle_roundtrips_through_u64() {
        let h = TransitionHandle::from(42);
        assert_eq!(u64::from(h), 42);
        assert_eq!(h.to_string(), "transition#42");
    }
}
