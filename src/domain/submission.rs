use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Représente une soumission de face swap complétée
///
/// Une ligne est créée par orchestration réussie, jamais modifiée ensuite.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    /// Identifiant unique de la soumission
    pub id: Uuid,
    /// Nom de la personne
    pub name: String,
    /// Adresse email de contact
    pub email: String,
    /// Numéro de téléphone (10 chiffres)
    pub phone: String,
    /// URL de l'image d'entrée uploadée chez le fournisseur
    pub original_image_url: String,
    /// URL de l'image de style uploadée chez le fournisseur
    pub style_image_url: String,
    /// URL de l'image générée par le face swap
    pub swapped_image_url: String,
    /// Acceptation des conditions d'utilisation
    pub terms_accepted: bool,
    /// Date de création
    pub created_at: DateTime<Utc>,
}

/// Données requises pour enregistrer une nouvelle soumission
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub original_image_url: String,
    pub style_image_url: String,
    pub swapped_image_url: String,
}
