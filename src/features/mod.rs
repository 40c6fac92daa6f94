pub mod auth;
pub mod locations;
