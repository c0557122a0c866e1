//! Patient and appointment records over PostgreSQL, served as JSON.

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod schema;
