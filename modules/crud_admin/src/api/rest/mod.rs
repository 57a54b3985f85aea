pub mod error;
pub mod form;
pub mod handlers;
pub mod problem;
pub mod request_id;
pub mod routes;
pub mod web;
