//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the document and user stores backed by the database.

pub mod store;
