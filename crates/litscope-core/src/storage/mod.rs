pub mod database;
pub mod queries;
pub mod repositories;
pub mod session;
