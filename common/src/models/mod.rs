pub mod plant;
pub mod session;
