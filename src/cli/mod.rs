pub mod build;
pub mod commands;
pub mod display;

pub use self::commands::{CliArgs, Commands};
