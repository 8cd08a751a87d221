//! # Submission Routes
//!
//! Ce module gère le cycle de vie des soumissions de face swap.
//!
//! ## Workflow
//! 1. Lecture du formulaire multipart (champs texte + deux images)
//! 2. Assainissement et validation des champs, validation des images
//! 3. Orchestration du face swap via [`FaceSwapService`]
//! 4. Persistance de la soumission, uniquement après le succès complet
//! 5. Listing paginé et consultation unitaire des soumissions
//!
//! ## Limites
//! - Taille maximale par image: configurable (2 Mo par défaut)
//! - Formats acceptés: JPEG et PNG, détectés depuis le contenu
//! - La requête reste bloquée pendant le polling du fournisseur: la
//!   latence dominante est `intervalle × budget de vérifications`

use actix_multipart::{Field, Multipart};
use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::core::faceswap_service::FaceSwapService;
use crate::domain::submission::{NewSubmission, Submission};
use crate::infrastructure::database::{Database, SubmissionsRepository};
use crate::infrastructure::error::{AppError, AppResult};
use crate::utils::config::Config;
use crate::utils::validation::{validate_image, validate_terms, SubmissionForm};

/// Taille maximale d'un champ texte du formulaire
const MAX_TEXT_FIELD_BYTES: usize = 4096;

/// Réponse de création de soumission
#[derive(Serialize)]
pub struct SubmissionCreatedResponse {
    pub submission: Submission,
    pub message: String,
}

/// Résumé d'une soumission (pour les listes)
#[derive(Serialize)]
pub struct SubmissionSummary {
    pub id: Uuid,
    pub name: String,
    pub swapped_image_url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Submission> for SubmissionSummary {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            name: submission.name,
            swapped_image_url: submission.swapped_image_url,
            created_at: submission.created_at,
        }
    }
}

/// Réponse du listing paginé
#[derive(Serialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<SubmissionSummary>,
    pub current_page: i64,
    pub total_pages: i64,
    pub total_count: i64,
}

/// Paramètres de pagination
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<i64>,
}

/// Contenu brut du formulaire multipart, avant validation
#[derive(Default)]
struct RawSubmission {
    name: String,
    email: String,
    phone: String,
    terms: String,
    image: Option<Vec<u8>>,
    style_image: Option<Vec<u8>>,
}

/// Endpoint de création d'une soumission
///
/// La requête reste ouverte pendant toute l'orchestration; en cas d'échec
/// d'une phase, rien n'est persisté et l'erreur est renvoyée telle quelle.
#[post("/submissions")]
pub async fn create_submission(
    payload: Multipart,
    db: web::Data<Database>,
    faceswap: web::Data<FaceSwapService>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let max_image_bytes = config.max_image_size_bytes();

    // 1. Lire le formulaire multipart
    let raw = parse_submission_form(payload, max_image_bytes).await?;

    // 2. Assainir puis valider les champs texte
    let form = SubmissionForm::from_raw(&raw.name, &raw.email, &raw.phone);
    form.validate()?;
    validate_terms(raw.terms == "on" || raw.terms == "true")?;

    // 3. Valider les deux images
    let input_bytes = raw
        .image
        .ok_or_else(|| AppError::BadRequest("L'image d'entrée est requise".to_string()))?;
    let style_bytes = raw
        .style_image
        .ok_or_else(|| AppError::BadRequest("L'image de style est requise".to_string()))?;
    let input = validate_image("image", input_bytes, max_image_bytes)?;
    let style = validate_image("styleImage", style_bytes, max_image_bytes)?;

    info!("📨 Nouvelle soumission de {} ({})", form.name, form.email);

    // 4. Orchestration du face swap
    let outcome = faceswap.swap_faces(&input, &style).await?;

    // 5. Persistance, uniquement après le succès complet
    let repository = SubmissionsRepository::new(db.pool.clone());
    let submission = repository
        .create(&NewSubmission {
            name: form.name,
            email: form.email,
            phone: form.phone,
            original_image_url: outcome.original_image_url,
            style_image_url: outcome.style_image_url,
            swapped_image_url: outcome.result.output_image_url,
        })
        .await?;

    info!("✅ Soumission {} enregistrée", submission.id);

    Ok(HttpResponse::Created().json(SubmissionCreatedResponse {
        submission,
        message: "Face swap réalisé avec succès".to_string(),
    }))
}

/// Listing paginé des soumissions, de la plus récente à la plus ancienne
#[get("/submissions")]
pub async fn list_submissions(
    query: web::Query<ListParams>,
    db: web::Data<Database>,
    config: web::Data<Config>,
) -> AppResult<HttpResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = config.page_size;
    let offset = (page - 1) * limit;

    let repository = SubmissionsRepository::new(db.pool.clone());
    let submissions = repository.list(limit, offset).await?;
    let total_count = repository.count().await?;

    Ok(HttpResponse::Ok().json(SubmissionListResponse {
        submissions: submissions.into_iter().map(SubmissionSummary::from).collect(),
        current_page: page,
        total_pages: total_pages(total_count, limit),
        total_count,
    }))
}

/// Consultation d'une soumission par son identifiant
#[get("/submissions/{id}")]
pub async fn get_submission(
    path: web::Path<Uuid>,
    db: web::Data<Database>,
) -> AppResult<HttpResponse> {
    let repository = SubmissionsRepository::new(db.pool.clone());
    let submission = repository.find_by_id(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(submission))
}

/// Nombre de pages nécessaires pour un total donné
fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if total_count == 0 {
        0
    } else {
        (total_count + page_size - 1) / page_size
    }
}

/// Lit tous les champs du formulaire multipart
async fn parse_submission_form(
    mut payload: Multipart,
    max_image_bytes: usize,
) -> AppResult<RawSubmission> {
    let mut raw = RawSubmission::default();

    while let Some(mut field) = payload.try_next().await? {
        let field_name = field
            .content_disposition()
            .get_name()
            .unwrap_or("")
            .to_string();

        match field_name.as_str() {
            "name" => raw.name = read_text_field(&mut field).await?,
            "email" => raw.email = read_text_field(&mut field).await?,
            "phone" => raw.phone = read_text_field(&mut field).await?,
            "terms" => raw.terms = read_text_field(&mut field).await?,
            "image" => raw.image = Some(read_file_field(&mut field, "image", max_image_bytes).await?),
            "styleImage" => {
                raw.style_image =
                    Some(read_file_field(&mut field, "styleImage", max_image_bytes).await?)
            }
            // Champ inconnu: drainé puis ignoré
            _ => while field.try_next().await?.is_some() {},
        }
    }

    Ok(raw)
}

/// Lit un champ texte en UTF-8
async fn read_text_field(field: &mut Field) -> AppResult<String> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if buffer.len() + chunk.len() > MAX_TEXT_FIELD_BYTES {
            return Err(AppError::BadRequest("Champ texte trop long".to_string()));
        }
        buffer.extend_from_slice(&chunk);
    }

    String::from_utf8(buffer)
        .map_err(|_| AppError::BadRequest("Champ texte non UTF-8".to_string()))
}

/// Lit un fichier en imposant la taille maximale au fil de l'eau
async fn read_file_field(
    field: &mut Field,
    label: &str,
    max_image_bytes: usize,
) -> AppResult<Vec<u8>> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.try_next().await? {
        if buffer.len() + chunk.len() > max_image_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "L'image \"{}\" dépasse la taille maximale de {} Mo",
                label,
                max_image_bytes / 1_000_000
            )));
        }
        buffer.extend_from_slice(&chunk);
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calcul_du_nombre_de_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
    }

    #[test]
    fn resume_d_une_soumission() {
        let submission = Submission {
            id: Uuid::new_v4(),
            name: "Jean Dupont".to_string(),
            email: "jean@example.com".to_string(),
            phone: "0612345678".to_string(),
            original_image_url: "https://img.lightx/u1.png".to_string(),
            style_image_url: "https://img.lightx/u2.png".to_string(),
            swapped_image_url: "https://out/img.jpg".to_string(),
            terms_accepted: true,
            created_at: Utc::now(),
        };

        let summary = SubmissionSummary::from(submission.clone());
        assert_eq!(summary.id, submission.id);
        assert_eq!(summary.name, "Jean Dupont");
        assert_eq!(summary.swapped_image_url, "https://out/img.jpg");
    }
}
