//! Infrastructure layer.

pub mod directory;
pub mod storage;

pub use self::{directory::Directory, storage::Storage};
