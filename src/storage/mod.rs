mod profile;
mod profile_storage;

pub use profile::UserProfile;
pub use profile_storage::{ProfileStorage, Result, StorageError};
