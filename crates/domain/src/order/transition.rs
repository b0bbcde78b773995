/// The five moves of the order state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Claim,
    Release,
    Complete,
    Cancel,
    Rate,
}

impl Transition {
    /// Returns the metric label for this transition.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Claim => "claim",
            Transition::Release => "release",
            Transition::Complete => "complete",
            Transition::Cancel => "cancel",
            Transition::Rate => "rate",
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
