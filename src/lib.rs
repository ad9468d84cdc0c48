pub mod api;
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod render;
pub mod routes;
pub mod sort;
pub mod state;
pub mod views;
