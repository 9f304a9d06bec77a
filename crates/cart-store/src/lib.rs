pub mod database;
pub mod error;
pub mod gateway;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod orders;
pub mod row;
pub mod schema;

pub use database::{Database, DatabaseConfig};
pub use error::StoreError;
pub use gateway::StorageGateway;
pub use orders::OrderRepo;
pub use row::Row;
