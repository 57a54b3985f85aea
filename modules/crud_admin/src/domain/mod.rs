pub mod error;
pub mod repo;
pub mod service;
pub mod shape;
pub mod validator;
