/// Coarse phase of the interview. `Active -> Ended` is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Ended,
}

/// Tracks whether the interview is still running and whether feedback arrived.
///
/// Feedback may arrive while the phase is still `Active` (when the server ends
/// the interview on its own); its presence is what counts for display.
#[derive(Debug, Clone)]
pub struct InterviewProgress {
    phase: Phase,
    feedback: Option<String>,
}

impl Default for InterviewProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl InterviewProgress {
    pub fn new() -> Self {
        Self {
            phase: Phase::Active,
            feedback: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn is_ended(&self) -> bool {
        self.phase == Phase::Ended
    }

    /// Answers and end requests are only valid while active.
    pub fn accepts_answers(&self) -> bool {
        self.is_active()
    }

    /// Moves to `Ended`. Returns `false` if the interview had already ended.
    pub fn end(&mut self) -> bool {
        if self.is_ended() {
            return false;
        }
        self.phase = Phase::Ended;
        true
    }

    /// Last write wins.
    pub fn record_feedback(&mut self, feedback: &str) {
        if self.feedback.is_some() {
            tracing::debug!("replacing previously received feedback");
        }
        self.feedback = Some(feedback.to_string());
    }

    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_is_one_way() {
        let mut progress = InterviewProgress::new();
        assert!(progress.accepts_answers());

        assert!(progress.end());
        assert!(progress.is_ended());
        assert!(!progress.accepts_answers());

        // A second end is a no-op.
        assert!(!progress.end());
        assert_eq!(progress.phase(), Phase::Ended);
    }

    #[test]
    fn test_feedback_last_write_wins() {
        let mut progress = InterviewProgress::new();
        assert_eq!(progress.feedback(), None);

        // Tolerated while still nominally active.
        progress.record_feedback("X");
        assert!(progress.is_active());
        assert_eq!(progress.feedback(), Some("X"));

        progress.record_feedback("Y");
        assert_eq!(progress.feedback(), Some("Y"));
    }
}
