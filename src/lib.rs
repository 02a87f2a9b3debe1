pub mod app;
pub mod config;
pub mod data;
pub mod map;
