pub mod app;
pub mod backend;
pub mod commands;
pub mod config;
pub mod models;
pub mod services;

pub use app::{App, AppError};
