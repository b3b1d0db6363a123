pub mod config;
pub mod models;
pub mod utils;

pub use crate::config::Config;
pub use crate::utils::*;
