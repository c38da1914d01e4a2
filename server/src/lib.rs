pub mod api;
pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod migrate;
pub mod model;
pub mod mongo_ext;
pub mod util;
