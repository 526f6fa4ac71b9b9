pub mod commands;
pub mod config;
pub mod util;

pub use config::Project;

pub const CONFIG_FILE: &str = "config.toml";
