mod session;

pub use session::{CompletedSession, SessionSnapshot, SessionState, DEFAULT_SUBJECT};
