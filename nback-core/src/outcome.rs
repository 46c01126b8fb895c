use serde::{Deserialize, Serialize};

/// Which of the two response channels fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// The "this is a target" channel.
    Confirm,
    /// The "this is not a target" channel.
    Wrong,
}

/// A registered response within the response window. Times are
/// milliseconds; `response_ms` is relative to session start,
/// `reaction_ms` to stimulus onset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub polarity: Polarity,
    pub response_ms: u32,
    pub reaction_ms: u32,
}

/// Standard signal-detection outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Hit,
    Miss,
    FalseAlarm,
    CorrectRejection,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        matches!(self, Outcome::Hit | Outcome::CorrectRejection)
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Hit => "CORRECT RESPONSE",
            Outcome::Miss => "MISSED TARGET",
            Outcome::FalseAlarm => "FALSE ALARM",
            Outcome::CorrectRejection => "CORRECT REJECTION",
        }
    }
}

/// Classify one finalized trial. A wrong-channel press on a target
/// still counts as a miss; on a non-target it is the expected
/// negative response.
pub fn classify(is_target: bool, response: Option<Polarity>) -> Outcome {
    match (is_target, response) {
        (true, Some(Polarity::Confirm)) => Outcome::Hit,
        (true, _) => Outcome::Miss,
        (false, Some(Polarity::Confirm)) => Outcome::FalseAlarm,
        (false, _) => Outcome::CorrectRejection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_covers_all_rows() {
        assert_eq!(classify(true, None), Outcome::Miss);
        assert_eq!(classify(true, Some(Polarity::Confirm)), Outcome::Hit);
        assert_eq!(classify(true, Some(Polarity::Wrong)), Outcome::Miss);
        assert_eq!(
            classify(false, Some(Polarity::Confirm)),
            Outcome::FalseAlarm
        );
        assert_eq!(
            classify(false, Some(Polarity::Wrong)),
            Outcome::CorrectRejection
        );
        assert_eq!(classify(false, None), Outcome::CorrectRejection);
    }

    #[test]
    fn only_hits_and_rejections_are_correct() {
        assert!(Outcome::Hit.is_correct());
        assert!(Outcome::CorrectRejection.is_correct());
        assert!(!Outcome::Miss.is_correct());
        assert!(!Outcome::FalseAlarm.is_correct());
    }
}
