pub mod error;
pub mod folders;
pub mod identity;
pub mod notes;
pub mod references;
pub mod tags;

pub use error::{ReferenceError, ServiceError};
pub use folders::FolderRepository;
pub use identity::{IdentityService, Registration};
pub use notes::NoteRepository;
pub use references::ReferenceValidator;
pub use tags::TagRepository;

/// Folder and tag names: present, and not just whitespace. Surrounding spaces are dropped.
pub(crate) fn require_name(name: Option<&str>) -> Result<String, ServiceError> {
    match name.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(ServiceError::validation("Missing `name` in request body")),
    }
}
