pub mod config;
pub mod manifest;
pub mod staging;
pub mod command;
pub mod cli;
