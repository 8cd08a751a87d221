use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use validator::ValidationErrors;

use crate::services::lightx::LightxError;

/// Type de résultat standard pour l'application
pub type AppResult<T> = Result<T, AppError>;

/// Erreurs principales de l'application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Ressource non trouvée (404 Not Found)
    #[error("{0} not found")]
    NotFound(String),

    /// Requête mal formée (400 Bad Request)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Données invalides (422 Unprocessable Entity)
    #[error("Validation failed: {0}")]
    ValidationError(ValidationErrors),

    /// Payload trop lourd (413 Payload Too Large)
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Type de média non supporté (415 Unsupported Media Type)
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Échec de l'orchestration du face swap (502 Bad Gateway,
    /// 504 Gateway Timeout si le budget de polling est épuisé)
    #[error("Face swap error: {0}")]
    FaceSwap(#[from] LightxError),

    /// Erreur de base de données (500 Internal Server Error)
    #[error("Database error: {0}")]
    DatabaseError(SqlxError),

    /// Erreur de configuration (500 Internal Server Error)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl AppError {
    /// Convertit l'erreur en code HTTP approprié
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::FaceSwap(LightxError::JobTimeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            AppError::FaceSwap(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structure de réponse d'erreur standardisée
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        let status = AppError::status_code(self);

        // Les erreurs internes sont loggées en détail, le client reçoit un
        // message générique; les échecs du fournisseur gardent leur message
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("❌ Erreur interne: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        })
    }
}

// Implémentations From pour les conversions automatiques

impl From<SqlxError> for AppError {
    fn from(error: SqlxError) -> Self {
        match &error {
            SqlxError::RowNotFound => AppError::NotFound("Resource".to_string()),
            _ => AppError::DatabaseError(error),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::ValidationError(errors)
    }
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(error: actix_multipart::MultipartError) -> Self {
        AppError::BadRequest(format!("Invalid multipart payload: {}", error))
    }
}
