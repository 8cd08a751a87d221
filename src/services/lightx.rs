//! # LightX Service
//!
//! Client HTTP pour l'API face swap de LightX. Il couvre les trois appels
//! du fournisseur plus le transfert présigné:
//!
//! ## Workflow
//! 1. `POST /v2/uploadImageUrl` — négociation d'une URL de transfert
//! 2. `PUT <uploadImage>` — transfert des octets bruts de l'image
//! 3. `POST /v1/face-swap` — initiation du job de face swap
//! 4. `POST /v1/order-status` — polling borné jusqu'à l'état terminal
//!
//! Le fournisseur encode le succès applicatif dans le corps JSON
//! (`statusCode == 2000`); cette convention est centralisée dans
//! [`ProviderEnvelope::into_body`] pour que les trois appels partagent la
//! même interprétation. Aucun appel n'est retenté: seul le polling répète
//! des vérifications de statut, dans la limite du budget accordé.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::{header, Client as HttpClient};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::swap::{SwapJob, SwapResult, SwapStatus};

/// Code de succès applicatif de l'API LightX
const PROVIDER_SUCCESS_CODE: i64 = 2000;

/// Budget de polling utilisé quand le fournisseur n'en fournit pas
const DEFAULT_MAX_RETRIES: u32 = 5;

/// Erreurs du client LightX, une variante par phase de l'orchestration
#[derive(Debug, thiserror::Error)]
pub enum LightxError {
    /// La négociation d'upload a été refusée (transport ou statusCode)
    #[error("image upload negotiation rejected: {0}")]
    UploadNegotiation(String),

    /// Le transfert des octets vers l'URL présignée a échoué
    #[error("image transfer failed: {0}")]
    UploadTransfer(String),

    /// La demande de face swap a été refusée
    #[error("face swap request rejected: {0}")]
    JobInitiation(String),

    /// Une vérification de statut a échoué; interrompt tout le polling
    #[error("status check failed: {0}")]
    Poll(String),

    /// Le fournisseur a explicitement signalé l'échec du job
    #[error("face swap processing failed")]
    JobFailed,

    /// Budget de polling épuisé sans état terminal
    #[error("face swap processing timed out after {attempts} status checks")]
    JobTimeout { attempts: u32 },
}

/// Client pour l'API LightX
pub struct LightxClient {
    http_client: Arc<HttpClient>,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
}

impl LightxClient {
    /// Crée un client avec un timeout de requête et un intervalle de
    /// polling explicites (tous deux issus de la configuration).
    pub fn new(
        base_url: String,
        api_key: String,
        poll_interval: Duration,
        request_timeout: Duration,
    ) -> Self {
        let http_client = Arc::new(
            HttpClient::builder()
                .timeout(request_timeout)
                .build()
                .expect("Failed to create HTTP client"),
        );

        Self {
            http_client,
            base_url,
            api_key,
            poll_interval,
        }
    }

    /// Upload une image chez le fournisseur et retourne son URL publique.
    ///
    /// Deux étapes: négociation d'une URL présignée, puis transfert des
    /// octets bruts avec le content type négocié. Aucun retry: un échec de
    /// transfert ne relance pas la négociation.
    pub async fn upload_image(
        &self,
        image: &[u8],
        content_type: &str,
    ) -> Result<String, LightxError> {
        // Étape 1: demander une URL de transfert présignée
        let request = UploadUrlRequest {
            upload_type: "imageUrl",
            size: image.len(),
            content_type,
        };
        let negotiation: UploadUrlBody = self
            .post_provider("/v2/uploadImageUrl", &request, LightxError::UploadNegotiation)
            .await?;

        // Étape 2: transférer les octets vers l'URL présignée
        let response = self
            .http_client
            .put(&negotiation.upload_image)
            .header(header::CONTENT_TYPE, content_type)
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| LightxError::UploadTransfer(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LightxError::UploadTransfer(format!(
                "HTTP {}",
                response.status().as_u16()
            )));
        }

        debug!(
            "📤 Image transférée ({} octets, {})",
            image.len(),
            content_type
        );
        Ok(negotiation.image_url)
    }

    /// Initie un job de face swap entre deux images déjà uploadées.
    ///
    /// Le budget de polling vient de la réponse du fournisseur; absent ou
    /// non positif, il retombe sur 5.
    pub async fn request_face_swap(
        &self,
        image_url: &str,
        style_image_url: &str,
    ) -> Result<SwapJob, LightxError> {
        let request = FaceSwapRequest {
            image_url,
            style_image_url,
        };
        let body: FaceSwapBody = self
            .post_provider("/v1/face-swap", &request, LightxError::JobInitiation)
            .await?;

        let max_retries = body
            .max_retries_allowed
            .filter(|n| *n > 0)
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_MAX_RETRIES);

        info!(
            "🎭 Face swap accepté: order {} ({} vérifications max)",
            body.order_id, max_retries
        );

        Ok(SwapJob {
            order_id: body.order_id,
            max_retries,
            created_at: Utc::now(),
        })
    }

    /// Poll le statut du job jusqu'à un état terminal.
    ///
    /// Machine à états bornée: au plus `max_retries` vérifications,
    /// chacune précédée d'une attente d'un intervalle fixe. Une erreur de
    /// transport ou de protocole interrompt immédiatement la boucle; elle
    /// n'est pas comptée comme une tentative normale.
    pub async fn poll_order_status(&self, job: &SwapJob) -> Result<SwapResult, LightxError> {
        let mut attempts = 0u32;

        while attempts < job.max_retries {
            tokio::time::sleep(self.poll_interval).await;

            let request = OrderStatusRequest {
                order_id: &job.order_id,
            };
            let report: OrderStatusBody = self
                .post_provider("/v1/order-status", &request, LightxError::Poll)
                .await?;

            match SwapStatus::from_report(&report.status, report.output) {
                SwapStatus::Completed(output_image_url) => {
                    info!("✅ Face swap terminé: {}", output_image_url);
                    return Ok(SwapResult { output_image_url });
                }
                SwapStatus::Failed => {
                    warn!(
                        "❌ Le fournisseur a signalé l'échec de l'order {}",
                        job.order_id
                    );
                    return Err(LightxError::JobFailed);
                }
                SwapStatus::Pending => {
                    attempts += 1;
                    debug!(
                        "⏳ Order {} toujours en traitement ({}/{})",
                        job.order_id, attempts, job.max_retries
                    );
                }
            }
        }

        Err(LightxError::JobTimeout { attempts })
    }

    // ---- helpers privés ----

    /// POST JSON vers un endpoint du fournisseur, avec l'interprétation
    /// commune transport 2xx puis statusCode == 2000. Les échecs sont
    /// construits via `phase_error` pour conserver la phase d'origine.
    async fn post_provider<Req, Body>(
        &self,
        path: &str,
        request: &Req,
        phase_error: fn(String) -> LightxError,
    ) -> Result<Body, LightxError>
    where
        Req: Serialize,
        Body: DeserializeOwned,
    {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| phase_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(phase_error(format!("HTTP {} → {}", status.as_u16(), body)));
        }

        let envelope: ProviderEnvelope<Body> = response
            .json()
            .await
            .map_err(|e| phase_error(e.to_string()))?;

        envelope.into_body().map_err(phase_error)
    }
}

// Structures du protocole LightX

/// Enveloppe commune aux réponses JSON du fournisseur
#[derive(Debug, Deserialize)]
struct ProviderEnvelope<T> {
    #[serde(rename = "statusCode")]
    status_code: i64,
    message: Option<String>,
    body: Option<T>,
}

impl<T> ProviderEnvelope<T> {
    /// Applique la convention du fournisseur: `statusCode == 2000` signifie
    /// succès, tout autre code est un refus applicatif.
    fn into_body(self) -> Result<T, String> {
        if self.status_code != PROVIDER_SUCCESS_CODE {
            return Err(self
                .message
                .unwrap_or_else(|| format!("statusCode {}", self.status_code)));
        }
        self.body
            .ok_or_else(|| "provider response has no body".to_string())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlRequest<'a> {
    upload_type: &'a str,
    size: usize,
    content_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlBody {
    /// URL présignée vers laquelle transférer les octets
    upload_image: String,
    /// URL publique de l'image une fois transférée
    image_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FaceSwapRequest<'a> {
    image_url: &'a str,
    style_image_url: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FaceSwapBody {
    order_id: String,
    max_retries_allowed: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderStatusRequest<'a> {
    order_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderStatusBody {
    status: String,
    output: Option<String>,
}
