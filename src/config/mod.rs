//! User configuration and the setup wizard.

pub mod file;
pub mod setup;

pub use file::{CONFIG_ENV_VAR, Config, Overrides};
pub use setup::run_setup;
