pub mod charm;
pub mod cli;

pub use charm::{CharmConfig, ConfigError, ConfigSource};
pub use cli::{Cli, Commands, ReplayArgs};
