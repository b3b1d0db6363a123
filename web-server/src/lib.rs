pub mod api;
pub mod auth;
pub mod backend;
pub mod email;
pub mod middleware;
pub mod session;
pub mod static_files;
pub mod utils;
