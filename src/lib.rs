pub mod analyzer;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod migration;
pub mod renderer;
pub mod splash;
pub mod transformer;
pub mod writer;

pub use cli::Cli;

// Re-export commonly used types
pub use analyzer::{AnalyzedFile, FileType, MigrationIssue, Severity};
pub use config::Config;
pub use error::{MigrationError, Result};
pub use migration::{MigrationCoordinator, MigrationMode, MigrationOptions, ProjectReport};
pub use transformer::{TransformationKind, TransformationRecord, TransformationStatus, Transformer};
