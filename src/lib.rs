pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod models;
pub mod storage;
pub mod tree;
