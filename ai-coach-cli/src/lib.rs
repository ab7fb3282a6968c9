// Library exports for AI Coach CLI
// This allows testing of internal modules

pub mod commands;
pub mod config;
pub mod models;
pub mod storage;
pub mod ui;
