//! SeaORM entity definitions for PostgreSQL database.

pub mod file;
pub mod file_access;
