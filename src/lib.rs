pub mod catalogue;
pub mod config;
pub mod database;
pub mod detail;
pub mod handlers;
pub mod interaction;
pub mod model;
pub mod session;
