//! HTTP surface for the quotation service: REST CRUD over an in-memory
//! store, background pipeline generation, and an agent roster API.

pub mod agents_api;
pub mod bootstrap;
pub mod health;
pub mod quotations;
pub mod responses;
pub mod store;

pub use bootstrap::Application;
