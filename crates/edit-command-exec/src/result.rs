//! Outcome of executing a command.

use serde::Serialize;
use std::fmt;

/// Tagged outcome of an execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchExecutionResult {
    /// Everything was applied.
    Success,
    /// A step needs a user and was skipped.
    Interactive,
    /// The command was empty.
    Nothing,
    /// Live content diverged from what the command was computed against; nothing was applied.
    Abort,
    /// Unconfirmed conflicts were reported.
    Conflicts,
    /// A hard failure or an error message.
    Error(String),
}

impl BatchExecutionResult {
    /// Combine the results of two commands run one after the other.
    ///
    /// Equal results collapse. Otherwise an error dominates, then conflicts, then abort, and
    /// anything else is a success. The ranking does not depend on which side a result is on;
    /// only two different error messages are order-sensitive, and the left one is kept.
    pub fn combine(self, other: BatchExecutionResult) -> BatchExecutionResult {
        use BatchExecutionResult::*;

        if self == other {
            return self;
        }
        match (self, other) {
            (error @ Error(_), _) | (_, error @ Error(_)) => error,
            (Conflicts, _) | (_, Conflicts) => Conflicts,
            (Abort, _) | (_, Abort) => Abort,
            _ => Success,
        }
    }

    /// Fold many results left to right, so the earliest error message wins. An empty sequence is [`BatchExecutionResult::Nothing`].
    pub fn combine_all<I>(results: I) -> BatchExecutionResult
    where
        I: IntoIterator<Item = BatchExecutionResult>,
    {
        results
            .into_iter()
            .reduce(BatchExecutionResult::combine)
            .unwrap_or(BatchExecutionResult::Nothing)
    }

    /// Returns `true` for [`BatchExecutionResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// User-facing message; `None` for success and nothing.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Success | Self::Nothing => None,
            Self::Interactive => Some("This action requires user interaction".to_string()),
            Self::Abort => {
                Some("The file was changed since the action was computed; try again".to_string())
            }
            Self::Conflicts => Some("The action has unresolved conflicts".to_string()),
            Self::Error(message) => Some(message.clone()),
        }
    }
}

impl fmt::Display for BatchExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => f.write_str("success"),
            Self::Interactive => f.write_str("interactive"),
            Self::Nothing => f.write_str("nothing"),
            Self::Abort => f.write_str("abort"),
            Self::Conflicts => f.write_str("conflicts"),
            Self::Error(message) => write!(f, "error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BatchExecutionResult::*;
    use super::*;

    #[test]
    fn test_combine_rules() {
        assert_eq!(Success.combine(Success), Success);
        assert_eq!(Nothing.combine(Nothing), Nothing);
        assert_eq!(Interactive.combine(Interactive), Interactive);
        assert_eq!(Nothing.combine(Interactive), Success);
        assert_eq!(Success.combine(Abort), Abort);
        assert_eq!(Abort.combine(Conflicts), Conflicts);
        assert_eq!(Conflicts.combine(Error("x".into())), Error("x".into()));
        assert_eq!(Error("a".into()).combine(Error("b".into())), Error("a".into()));
    }

    #[test]
    fn test_combine_is_order_independent() {
        let pairs = [
            (Conflicts, Error("x".into())),
            (Abort, Conflicts),
            (Abort, Error("x".into())),
            (Success, Abort),
            (Nothing, Conflicts),
            (Interactive, Success),
        ];
        for (left, right) in pairs {
            assert_eq!(
                left.clone().combine(right.clone()),
                right.clone().combine(left.clone()),
                "{left} then {right}"
            );
        }
        assert_eq!(Error("x".into()).combine(Conflicts), Error("x".into()));
        assert_eq!(Conflicts.combine(Abort), Conflicts);
    }

    #[test]
    fn test_combine_all_keeps_first_error_message() {
        let results = [Abort, Error("first".into()), Conflicts, Error("second".into())];
        assert_eq!(BatchExecutionResult::combine_all(results), Error("first".into()));
    }

    #[test]
    fn test_combine_all() {
        assert_eq!(BatchExecutionResult::combine_all([]), Nothing);
        assert_eq!(BatchExecutionResult::combine_all([Success, Nothing, Abort]), Abort);
    }

    #[test]
    fn test_messages() {
        assert_eq!(Success.message(), None);
        assert_eq!(Nothing.message(), None);
        assert_eq!(Error("boom".into()).message().as_deref(), Some("boom"));
        assert!(Abort.message().is_some());
        assert_eq!(Error("boom".into()).to_string(), "error: boom");
    }

    #[test]
    fn test_serialize_tagged() {
        let value = serde_json::to_value(Error("boom".into())).unwrap();
        assert_eq!(value, serde_json::json!({ "kind": "ERROR", "message": "boom" }));
        let value = serde_json::to_value(Success).unwrap();
        assert_eq!(value, serde_json::json!({ "kind": "SUCCESS" }));
    }
}
