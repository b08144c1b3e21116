//! Outcome model: one record per invocation, or one synthetic record for an aborted expansion.

use std::fmt;

/// Classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FailureKind {
    CountMismatch,
    UnresolvedBinding,
    DuplicateBinding,
    MissingBinding,
    TypeMismatch,
    EmptyValues,
    ProviderResolution,
    /// The test body reported failure.
    TestFailure,
    /// The test body panicked.
    Panic,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::CountMismatch => "CountMismatch",
            FailureKind::UnresolvedBinding => "UnresolvedBinding",
            FailureKind::DuplicateBinding => "DuplicateBinding",
            FailureKind::MissingBinding => "MissingBinding",
            FailureKind::TypeMismatch => "TypeMismatch",
            FailureKind::EmptyValues => "EmptyValues",
            FailureKind::ProviderResolution => "ProviderResolution",
            FailureKind::TestFailure => "TestFailure",
            FailureKind::Panic => "Panic",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an outcome did not pass: classification, message and optional nested cause.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FailureDetail {
    pub kind: FailureKind,
    pub message: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub cause: Option<Box<FailureDetail>>,
}

impl FailureDetail {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: FailureDetail) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Build a detail from an error and its `source()` chain; every link keeps `kind`.
    pub fn from_error(kind: FailureKind, err: &(dyn std::error::Error + 'static)) -> Self {
        let mut messages = vec![err.to_string()];
        let mut source = err.source();
        while let Some(next) = source {
            messages.push(next.to_string());
            source = next.source();
        }

        let mut detail: Option<FailureDetail> = None;
        for message in messages.into_iter().rev() {
            let link = FailureDetail::new(kind, message);
            detail = Some(match detail {
                Some(cause) => link.with_cause(cause),
                None => link,
            });
        }
        detail.unwrap_or_else(|| FailureDetail::new(kind, String::new()))
    }

    /// This detail followed by its nested causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &FailureDetail> {
        std::iter::successors(Some(self), |d| d.cause.as_deref())
    }
}

impl fmt::Display for FailureDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        for cause in self.chain().skip(1) {
            write!(f, "\n  caused by: {}", cause.message)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutcomeStatus {
    Passed,
    Failed,
    /// Configuration error: the expansion was aborted.
    Error,
}

/// The recorded result of one invocation, or of a whole-method configuration failure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    pub display_name: String,
    pub status: OutcomeStatus,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub failure: Option<FailureDetail>,
}

impl Outcome {
    pub fn passed(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            status: OutcomeStatus::Passed,
            failure: None,
        }
    }

    pub fn failed(display_name: impl Into<String>, failure: FailureDetail) -> Self {
        Self {
            display_name: display_name.into(),
            status: OutcomeStatus::Failed,
            failure: Some(failure),
        }
    }

    pub fn error(display_name: impl Into<String>, failure: FailureDetail) -> Self {
        Self {
            display_name: display_name.into(),
            status: OutcomeStatus::Error,
            failure: Some(failure),
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == OutcomeStatus::Passed
    }
}

/// What the host's invocation capability reports for one combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    pub passed: bool,
    pub failure: Option<FailureDetail>,
}

impl InvocationResult {
    pub fn pass() -> Self {
        Self {
            passed: true,
            failure: None,
        }
    }

    /// A failing test body, classified as [`FailureKind::TestFailure`].
    pub fn fail(message: impl Into<String>) -> Self {
        Self::fail_with(FailureDetail::new(FailureKind::TestFailure, message))
    }

    pub fn fail_with(failure: FailureDetail) -> Self {
        Self {
            passed: false,
            failure: Some(failure),
        }
    }

    pub(crate) fn into_outcome(self, display_name: String) -> Outcome {
        if self.passed {
            return Outcome::passed(display_name);
        }
        let failure = self
            .failure
            .unwrap_or_else(|| FailureDetail::new(FailureKind::TestFailure, "test body reported failure"));
        Outcome::failed(display_name, failure)
    }
}

impl From<bool> for InvocationResult {
    fn from(passed: bool) -> Self {
        if passed { Self::pass() } else { Self::fail("test body reported failure") }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("outer")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("inner")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    impl std::error::Error for Inner {}

    #[test]
    fn test_from_error_nests_source_chain() {
        let detail = FailureDetail::from_error(FailureKind::ProviderResolution, &Outer(Inner));
        let messages: Vec<&str> = detail.chain().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["outer", "inner"]);
        assert_eq!(detail.to_string(), "ProviderResolution: outer\n  caused by: inner");
    }

    #[test]
    fn test_failed_invocation_without_detail_gets_default_message() {
        let outcome = InvocationResult::from(false).into_outcome("#1: t()".into());
        assert_eq!(outcome.status, OutcomeStatus::Failed);
        assert_eq!(
            outcome.failure.map(|f| f.kind),
            Some(FailureKind::TestFailure)
        );
    }
}
