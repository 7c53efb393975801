pub mod firebird;
pub mod manager;
pub mod models;
pub mod row;
pub mod tenant;

pub use firebird::FirebirdGateway;
pub use manager::{DatabaseError, DatabaseManager};
pub use row::{Cell, Row};
pub use tenant::{TenantConnection, TenantGateway};
