use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image reçue du formulaire, prête à être transférée au fournisseur
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Contenu brut du fichier
    pub bytes: Vec<u8>,
    /// Type MIME canonique détecté depuis le contenu
    pub content_type: String,
}

/// Job de face swap accepté par le fournisseur
///
/// Transient: créé par l'initiation du swap, consommé par le polling,
/// jamais persisté.
#[derive(Debug, Clone)]
pub struct SwapJob {
    /// Identifiant de commande côté fournisseur
    pub order_id: String,
    /// Budget de vérifications de statut accordé par le fournisseur
    pub max_retries: u32,
    /// Date d'acceptation du job
    pub created_at: DateTime<Utc>,
}

/// Résultat terminal d'un job de face swap réussi
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapResult {
    /// URL publique de l'image générée
    pub output_image_url: String,
}

/// Résultat complet de l'orchestration: les deux URLs uploadées plus
/// l'image générée, tel qu'attendu par la couche de persistance.
#[derive(Debug, Clone)]
pub struct FaceSwapOutcome {
    pub original_image_url: String,
    pub style_image_url: String,
    pub result: SwapResult,
}

/// Interprétation d'un rapport de statut du fournisseur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapStatus {
    /// Le fournisseur a livré l'image générée
    Completed(String),
    /// Le fournisseur a explicitement signalé un échec
    Failed,
    /// Toujours en traitement, consomme une tentative
    Pending,
}

impl SwapStatus {
    /// Interprète le couple (status, output) renvoyé par `/order-status`.
    ///
    /// Un statut "active" sans output est traité comme encore en attente:
    /// le fournisseur peut annoncer l'état avant que l'image soit prête.
    pub fn from_report(status: &str, output: Option<String>) -> Self {
        match (status, output) {
            ("active", Some(url)) if !url.is_empty() => SwapStatus::Completed(url),
            ("failed", _) => SwapStatus::Failed,
            _ => SwapStatus::Pending,
        }
    }
}
