//! Generic CRUD admin over configurable flat record shapes.
//!
//! One store, one validator and one page composer serve every entity kind;
//! entity kinds are described by [`domain::shape::ShapeDescriptor`] values
//! (the built-in `user` and `task` shapes, or whatever the configuration lists).
//! Pages are emitted as FastUI component trees.

pub mod api;
pub mod config;
pub mod contract;
pub mod domain;
pub mod infra;
pub mod module;
pub mod ui;

pub use config::CrudAdminConfig;
pub use module::CrudAdmin;
