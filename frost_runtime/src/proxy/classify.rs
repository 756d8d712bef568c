//! Access classification.
//!
//! Every member access through a proxy is classified before anything
//! touches the wrapped object. Writes and deletes are rejected whatever the
//! member is; reads and calls are forwarded when the proxy's shape exposes
//! the member and reported missing otherwise.
//!
//! Calls are never analysed for side effects. A forwarded method runs with
//! the proxy (or, for builtin containers, a read-only method) as receiver,
//! so any write it attempts comes back through a proxy and is rejected
//! there.

use crate::proxy::ProxyShape;

/// The kind of member access being attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
    Delete,
    Call,
}

impl AccessKind {
    /// Verb used in rejection messages.
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "change",
            Self::Delete => "delete",
            Self::Call => "call",
        }
    }

    /// Whether the access can modify the target.
    #[inline]
    pub const fn is_mutation(self) -> bool {
        matches!(self, Self::Write | Self::Delete)
    }
}

/// Outcome of classifying an access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    /// Resolve on the target and deep-wrap the result.
    Forward,
    /// Refuse with a constant-attribute error.
    Reject,
    /// The shape does not expose the member.
    Absent,
}

/// Decide how a proxy with `shape` handles `kind` on member `name`.
pub fn classify(shape: &dyn ProxyShape, name: &str, kind: AccessKind) -> AccessDecision {
    if kind.is_mutation() {
        AccessDecision::Reject
    } else if shape.exposes(name) {
        AccessDecision::Forward
    } else {
        AccessDecision::Absent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::{ExposedShape, ObjectShape};

    #[test]
    fn test_mutations_always_rejected() {
        let shapes: [&dyn ProxyShape; 2] = [&ObjectShape, &ExposedShape::new("ListProxy", &["index"])];
        for shape in shapes {
            for name in ["x", "index", "append", "__class__"] {
                assert_eq!(classify(shape, name, AccessKind::Write), AccessDecision::Reject);
                assert_eq!(classify(shape, name, AccessKind::Delete), AccessDecision::Reject);
            }
        }
    }

    #[test]
    fn test_generic_shape_forwards_reads() {
        assert_eq!(classify(&ObjectShape, "anything", AccessKind::Read), AccessDecision::Forward);
        assert_eq!(classify(&ObjectShape, "method", AccessKind::Call), AccessDecision::Forward);
    }

    #[test]
    fn test_container_shape_hides_unexposed() {
        let shape = ExposedShape::new("ListProxy", &["index", "count"]);
        assert_eq!(classify(&shape, "index", AccessKind::Call), AccessDecision::Forward);
        assert_eq!(classify(&shape, "append", AccessKind::Call), AccessDecision::Absent);
        assert_eq!(classify(&shape, "append", AccessKind::Read), AccessDecision::Absent);
    }

    #[test]
    fn test_verbs() {
        assert_eq!(AccessKind::Write.verb(), "change");
        assert_eq!(AccessKind::Delete.verb(), "delete");
        assert!(!AccessKind::Call.is_mutation());
    }
}
