// src/lib.rs

pub mod board;
pub mod config;
pub mod content;
pub mod error;
pub mod models;
pub mod store;
pub mod tree;

// Re-export the service surface for convenience
pub use board::Board;
pub use error::BoardError;
