//! Types: request values, response vocabulary, model names and wire DTOs.

pub mod common;
pub mod models;
pub mod request;
pub mod wire;

pub use common::*;
pub use models::*;
pub use request::*;
pub use wire::*;
