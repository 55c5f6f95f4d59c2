//! Session state shared by every view
//!
//! - `types`: the session record, login draft and persisted snapshot
//! - `storage`: durable persistence of the snapshot
//! - `store`: the single-writer store with change notification

pub mod storage;
pub mod store;
pub mod types;

pub use storage::{FileSessionStorage, MemorySessionStorage, SessionPersistence};
pub use store::SessionStore;
pub use types::{
    CommittedSession, CredentialDraft, CredentialField, PersistedSession, Session,
    SessionSnapshot,
};
