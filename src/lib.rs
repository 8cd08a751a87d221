// lib.rs
// Modules principaux
pub mod api;
pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod services;
pub mod utils;

// Ré-exports pour faciliter l'utilisation
pub use infrastructure::error::{AppError, AppResult};

// Version de l'application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "Face Swap Platform";
