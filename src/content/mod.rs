//! Denormalized section content: shape classification and the
//! stale-reference cleanup sweep that runs after entity deletion.

pub mod cleanup;
pub mod model;

pub use cleanup::{scrub_content, scrub_deleted_entity, CleanupReport};
pub use model::{ContentEntry, ContentKind, DeletedEntity, SectionContent};
