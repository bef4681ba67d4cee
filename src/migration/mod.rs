mod types;
mod coordinator;
pub mod recommendations;

pub use types::*;
pub use coordinator::MigrationCoordinator;
