//! Persistence implementations for the user and post repositories.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
pub mod entity;
#[cfg(feature = "postgres")]
mod postgres;

pub use connections::{DatabaseConfig, DatabaseConnections};
pub use memory::{MemoryPostRepository, MemoryUserRepository};

#[cfg(feature = "postgres")]
pub use postgres::{PostgresPostRepository, PostgresUserRepository};

#[cfg(test)]
mod tests;
