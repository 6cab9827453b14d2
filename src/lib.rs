// src/lib.rs

pub mod config;
pub mod engine_lib;
pub mod error;
pub mod generator;
pub mod geometry;

pub use config::EditorConfig;
pub use error::{ConfigError, RingDefect, StorageError, StoreError};
pub use geometry::Vertex;
