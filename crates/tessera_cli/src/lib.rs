pub mod config_loader;
pub mod exec;
pub mod walk;
