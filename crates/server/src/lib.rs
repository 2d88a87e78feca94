//! Fruit price prediction HTTP server

pub mod api;
pub mod config;
