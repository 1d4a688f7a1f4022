use std::fmt;

/// Stage of a review session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    AwaitProblem,
    AwaitLanguage,
    AwaitCode,
    Reviewing,
    Qa,
    /// Intake timed out or the inbox closed before a review was requested.
    Cancelled,
    /// The review could not be produced.
    Failed,
    /// The user typed `finish`.
    Finished,
    /// The follow-up window ran out.
    Expired,
}

impl Phase {
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Failed | Self::Finished | Self::Expired
        )
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitProblem => "await_problem",
            Self::AwaitLanguage => "await_language",
            Self::AwaitCode => "await_code",
            Self::Reviewing => "reviewing",
            Self::Qa => "qa",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Finished => "finished",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
