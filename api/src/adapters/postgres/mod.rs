//! PostgreSQL adapters
//!
//! Implementations of repository traits using SeaORM and PostgreSQL.

pub mod group_repo;


pub use group_repo::PostgresGroupRepository;
