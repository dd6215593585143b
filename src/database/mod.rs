pub mod applications;
pub mod manager;

pub use applications::PgApplicationStore;
pub use manager::{DatabaseError, DatabaseManager};
