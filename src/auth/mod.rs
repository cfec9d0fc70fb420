//! Authentication: credential encoding, session state, and persistence.

pub mod credential;
pub mod manager;
pub mod store;

pub use credential::CredentialEncoder;
pub use manager::{Session, SessionManager};
pub use store::SessionStore;
