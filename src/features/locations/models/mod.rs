pub mod location;

pub use location::{prepare_document, prepare_update, require_stage_fields};
