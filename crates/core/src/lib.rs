//! Domain types and scheduling rules shared by the storage and HTTP layers.

pub mod errors;
pub mod models;
pub mod validation;
