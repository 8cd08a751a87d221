// core/mod.rs
pub mod faceswap_service;

// Ré-exports pour faciliter l'import
pub use faceswap_service::FaceSwapService;
