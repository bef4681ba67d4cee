pub mod migrate;
pub mod batch;
pub mod interactive;
pub mod completion;
pub mod config;

pub use migrate::handle_run;
pub use batch::handle_batch;
pub use interactive::handle_interactive;
pub use completion::{install_completions, print_completions};
pub use config::handle_config;
