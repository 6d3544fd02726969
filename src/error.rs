//! Configuration-time errors.
//!
//! Every variant here is a *programmer* error in the middleware
//! declarations, surfaced by [`Stack::compile`](crate::Stack::compile)
//! before any request flows through the chain. A compiled chain introduces
//! no error semantics of its own — whatever the wrapped handlers raise is
//! their business.

use thiserror::Error;

/// The error type returned by lamina's fallible operations.
///
/// Compilation either fully succeeds or fully fails; there is no partial
/// or degraded chain.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Two registered middlewares share a name. Names identify middlewares
    /// in constraints, so a duplicate makes the configuration ambiguous.
    #[error("duplicate middleware name `{name}`")]
    DuplicateName { name: String },

    /// One or more `requires` entries name middlewares that are not
    /// registered. Every `(middleware, missing requirement)` pair is
    /// collected, not just the first, so one compile reports the whole
    /// configuration problem.
    #[error("unmet requirements: {}", render_violations(.violations))]
    MissingRequirement {
        /// `(middleware, missing requirement)` pairs in registration order.
        violations: Vec<(String, String)>,
    },

    /// The before/after constraints admit no linear order.
    #[error("constraint cycle between middlewares: {}", .members.join(", "))]
    ConstraintCycle {
        /// Names of the middlewares on the cycle, in registration order.
        members: Vec<String>,
    },
}

fn render_violations(violations: &[(String, String)]) -> String {
    violations
        .iter()
        .map(|(name, missing)| format!("`{name}` requires `{missing}`, which is not registered"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_requirement_lists_every_pair() {
        let err = Error::MissingRequirement {
            violations: vec![
                ("auth".to_owned(), "session".to_owned()),
                ("trace".to_owned(), "request-id".to_owned()),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("`auth` requires `session`"));
        assert!(msg.contains("`trace` requires `request-id`"));
    }

    #[test]
    fn cycle_names_members() {
        let err = Error::ConstraintCycle {
            members: vec!["a".to_owned(), "b".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "constraint cycle between middlewares: a, b"
        );
    }
}
