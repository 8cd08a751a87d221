// services/mod.rs
pub mod lightx;

// Ré-exports pour faciliter l'import
pub use lightx::{LightxClient, LightxError};
