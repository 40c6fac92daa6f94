//! Map-location records across the review workflow.
//!
//! Records live in one of three collections: `sample_data` (seeded from CSV),
//! `pending_data` (awaiting review) and `reviewed_data` (approved). One set of
//! handlers serves all three, dispatched on the validated collection name.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/locations/{collection}` | List all documents |
//! | POST | `/api/locations/{collection}` | Create one document |
//! | POST | `/api/locations/{collection}/batch` | Create many documents |
//! | PUT | `/api/locations/{collection}/{id}` | Partial update |
//! | DELETE | `/api/locations/{collection}` | Bulk delete by id |
//! | POST | `/api/locations/{collection}/{id}/move/{to_collection}` | Move between collections |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{LocationService, SeedImportService};
