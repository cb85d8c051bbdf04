pub mod adapter;
pub mod cli;
pub mod config;
pub mod lint;
pub mod template;
