pub mod db;
pub mod identity;
pub mod models;
pub mod session;
pub mod snapshot;

pub use db::Database;
pub use identity::{IdentityProvider, StaticIdentity};
pub use models::{CompletedSession, SessionSnapshot, SessionState, DEFAULT_SUBJECT};
pub use session::{format_time, CompletedSessionSink, SessionEvent, SessionTimerStore, SNAPSHOT_KEY};
pub use snapshot::{FileStorage, KeyValueStorage, MemoryStorage};
