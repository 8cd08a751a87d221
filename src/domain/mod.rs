//! # Domain Models Module
//!
//! Ce module contient les modèles de données principaux de l'application.
//! Ces modèles représentent les entités métier et sont utilisés à travers
//! toute l'application (API, services, base de données).
//!
//! ## Structure
//! - `submission.rs`: Soumission persistée (formulaire + URLs des images)
//! - `swap.rs`: Types transients de l'orchestration du face swap
//!
//! ## Conventions
//! - Les identifiants utilisent `uuid::Uuid` pour éviter les conflits
//! - Les timestamps utilisent `chrono::DateTime<chrono::Utc>` pour l'uniformité

pub mod submission;
pub mod swap;

// Ré-export des types principaux pour une utilisation facile
pub use submission::{NewSubmission, Submission};
pub use swap::{FaceSwapOutcome, SwapJob, SwapResult, SwapStatus, UploadedImage};
