/// Advisory UI notifications. These mirror what the frontend shows as
/// toasts; they are not part of the state machine contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started { subject: String },
    Completed { subject: String, duration: String },
    SaveFailed { reason: String },
}

impl SessionEvent {
    pub fn message(&self) -> String {
        match self {
            SessionEvent::Started { subject } => format!("Started studying: {subject}"),
            SessionEvent::Completed { subject, duration } => {
                format!("{subject} - {duration} recorded.")
            }
            SessionEvent::SaveFailed { .. } => "Failed to save session".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let started = SessionEvent::Started {
            subject: "Math".to_string(),
        };
        assert_eq!(started.message(), "Started studying: Math");

        let completed = SessionEvent::Completed {
            subject: "Math".to_string(),
            duration: "25:00".to_string(),
        };
        assert_eq!(completed.message(), "Math - 25:00 recorded.");

        let failed = SessionEvent::SaveFailed {
            reason: "network down".to_string(),
        };
        assert_eq!(failed.message(), "Failed to save session");
    }
}
