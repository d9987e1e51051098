//! User directory module.
//!
//! The session operations only need an existence check; account
//! management and authentication live outside this service.

mod directory;

pub use directory::{KvUserDirectory, StaticUserDirectory, UserDirectory};
