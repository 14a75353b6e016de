pub mod config;
pub mod config_loader;
pub mod error;
pub mod task;
pub mod traits;
pub mod workdir;

pub use config::PublishConfig;
pub use config_loader::{ConfigLoadOptions, ConfigLoader};
pub use error::*;
pub use task::PublishTask;
pub use traits::*;
pub use workdir::{DirectoryGuard, WorkingDirectory};
