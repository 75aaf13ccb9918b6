use core::fmt;

/// Errors reported by the fallible operations of the tree and its adapters.
///
/// Lookups that may legitimately miss return [`Option`]; these variants cover
/// the accessors and mutations whose caller asserted something that turned out
/// to be false.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum Error {
    /// A required key was not present (`at`-style access).
    KeyNotFound,

    /// A [`NodeRef`](crate::NodeRef) was issued by another tree, or its node
    /// has since been removed.
    InvalidNode,

    /// Storage for a new node could not be reserved.
    AllocationFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyNotFound => write!(f, "key not found"),

            Self::InvalidNode => write!(f, "node reference does not belong to this tree"),

            Self::AllocationFailed => write!(f, "node allocation failed"),
        }
    }
}

impl core::error::Error for Error {}
