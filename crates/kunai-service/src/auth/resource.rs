//! Resource kinds subject to authorization.

use std::fmt;

/// Kind of resource an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Task,
    Category,
    User,
}

impl ResourceKind {
    /// Returns the lowercase name used in logs and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Category => "category",
            Self::User => "user",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
