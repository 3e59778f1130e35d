//! Core types shared by every engine

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
