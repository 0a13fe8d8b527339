pub mod archive;
pub mod config;
