//! Username/password check for the map frontend.
//!
//! Passwords are stored as bcrypt hashes. A successful login returns the
//! username and a role string; no server-side session is kept.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use services::AuthService;
