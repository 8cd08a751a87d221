use sqlx::{query_as, query_scalar, Pool, Postgres};
use uuid::Uuid;

use crate::domain::submission::{NewSubmission, Submission};
use crate::infrastructure::error::{AppError, AppResult};

/// Repository pour les opérations sur les soumissions
#[derive(Clone)]
pub struct SubmissionsRepository {
    pool: Pool<Postgres>,
}

impl SubmissionsRepository {
    /// Crée une nouvelle instance du repository
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Enregistre une soumission complétée
    ///
    /// Appelé uniquement après le succès complet de l'orchestration: une
    /// soumission porte toujours l'URL de l'image générée.
    pub async fn create(&self, new_submission: &NewSubmission) -> AppResult<Submission> {
        let submission = query_as::<_, Submission>(
            r#"
            INSERT INTO submissions (
                id, name, email, phone, original_image_url, style_image_url,
                swapped_image_url, terms_accepted, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, NOW())
            RETURNING
                id, name, email, phone, original_image_url, style_image_url,
                swapped_image_url, terms_accepted, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_submission.name)
        .bind(&new_submission.email)
        .bind(&new_submission.phone)
        .bind(&new_submission.original_image_url)
        .bind(&new_submission.style_image_url)
        .bind(&new_submission.swapped_image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(submission)
    }

    /// Récupère une soumission par son ID
    pub async fn find_by_id(&self, id: &Uuid) -> AppResult<Submission> {
        let submission = query_as::<_, Submission>(
            r#"
            SELECT
                id, name, email, phone, original_image_url, style_image_url,
                swapped_image_url, terms_accepted, created_at
            FROM submissions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission".to_string()))?;

        Ok(submission)
    }

    /// Liste les soumissions avec pagination, de la plus récente à la
    /// plus ancienne
    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<Vec<Submission>> {
        let submissions = query_as::<_, Submission>(
            r#"
            SELECT
                id, name, email, phone, original_image_url, style_image_url,
                swapped_image_url, terms_accepted, created_at
            FROM submissions
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(submissions)
    }

    /// Compte le nombre total de soumissions
    pub async fn count(&self) -> AppResult<i64> {
        let total = query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions")
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}
