pub mod config;
pub mod serve;

pub use config::{run_config, ConfigArgs};
pub use serve::{run_serve, ServeArgs};
