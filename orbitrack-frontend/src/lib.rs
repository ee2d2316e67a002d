pub mod app;
pub mod backend;
pub mod command;
pub mod config;
pub mod interaction;
pub mod pipeline;
pub mod scene;
