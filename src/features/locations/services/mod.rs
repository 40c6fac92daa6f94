pub mod import_service;
pub mod location_service;

pub use import_service::{ImportOutcome, SeedImportService};
pub use location_service::LocationService;
