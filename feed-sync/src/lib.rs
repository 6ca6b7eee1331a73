pub mod cli;
pub mod cms;
pub mod load_config;

pub use cli::{run, Cli, Commands};
