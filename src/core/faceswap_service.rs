// core/faceswap_service.rs
use std::sync::Arc;

use tracing::{info, instrument};

use crate::domain::swap::{FaceSwapOutcome, UploadedImage};
use crate::services::lightx::{LightxClient, LightxError};

/// Façade d'orchestration du face swap
///
/// Enchaîne les quatre phases: upload de l'image d'entrée, upload de
/// l'image de style, initiation du job, polling jusqu'à l'état terminal.
/// Le premier échec interrompt toute l'opération; aucune phase n'est
/// retentée (le polling gère lui-même son budget de vérifications).
#[derive(Clone)]
pub struct FaceSwapService {
    lightx: Arc<LightxClient>,
}

impl FaceSwapService {
    pub fn new(lightx: LightxClient) -> Self {
        Self {
            lightx: Arc::new(lightx),
        }
    }

    /// Réalise le face swap complet entre deux images.
    ///
    /// Retourne les URLs des deux images uploadées plus l'image générée,
    /// pour que l'appelant puisse persister une soumission complète. Rien
    /// n'est persisté ici: en cas d'échec, aucun résultat partiel ne sort.
    #[instrument(skip_all)]
    pub async fn swap_faces(
        &self,
        input: &UploadedImage,
        style: &UploadedImage,
    ) -> Result<FaceSwapOutcome, LightxError> {
        // 1. Upload de l'image d'entrée
        let original_image_url = self
            .lightx
            .upload_image(&input.bytes, &input.content_type)
            .await?;
        info!("📥 Image d'entrée uploadée: {}", original_image_url);

        // 2. Upload de l'image de style
        let style_image_url = self
            .lightx
            .upload_image(&style.bytes, &style.content_type)
            .await?;
        info!("📥 Image de style uploadée: {}", style_image_url);

        // 3. Initiation du job de face swap
        let job = self
            .lightx
            .request_face_swap(&original_image_url, &style_image_url)
            .await?;

        // 4. Polling jusqu'à l'état terminal
        let result = self.lightx.poll_order_status(&job).await?;

        Ok(FaceSwapOutcome {
            original_image_url,
            style_image_url,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POLL_INTERVAL: Duration = Duration::from_millis(20);

    fn test_service(server: &MockServer) -> FaceSwapService {
        FaceSwapService::new(LightxClient::new(
            server.uri(),
            "test-api-key".to_string(),
            POLL_INTERVAL,
            Duration::from_secs(5),
        ))
    }

    fn png_image() -> UploadedImage {
        UploadedImage {
            bytes: vec![1, 2, 3, 4],
            content_type: "image/png".to_string(),
        }
    }

    /// Scénario complet: deux uploads, initiation avec un budget de 3,
    /// deux réponses "processing" puis le succès à la troisième
    /// vérification, chaque vérification précédée d'une attente.
    #[tokio::test]
    async fn swap_faces_bout_en_bout() {
        let server = MockServer::start().await;

        // Première négociation → u1, seconde → u2
        Mock::given(method("POST"))
            .and(path("/v2/uploadImageUrl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 2000,
                "body": {
                    "uploadImage": format!("{}/presigned-target", server.uri()),
                    "imageUrl": "https://img.lightx/u1.png",
                }
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v2/uploadImageUrl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 2000,
                "body": {
                    "uploadImage": format!("{}/presigned-target", server.uri()),
                    "imageUrl": "https://img.lightx/u2.png",
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/presigned-target"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        // L'ordre des URLs vérifie que l'image d'entrée est bien uploadée
        // avant l'image de style
        Mock::given(method("POST"))
            .and(path("/v1/face-swap"))
            .and(body_json(json!({
                "imageUrl": "https://img.lightx/u1.png",
                "styleImageUrl": "https://img.lightx/u2.png",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 2000,
                "body": { "orderId": "abc", "maxRetriesAllowed": 3 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/order-status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 2000,
                "body": { "status": "processing" }
            })))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/order-status"))
            .and(body_json(json!({ "orderId": "abc" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 2000,
                "body": { "status": "active", "output": "https://out/img.jpg" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = test_service(&server);
        let start = Instant::now();
        let outcome = service
            .swap_faces(&png_image(), &png_image())
            .await
            .unwrap();

        assert_eq!(outcome.original_image_url, "https://img.lightx/u1.png");
        assert_eq!(outcome.style_image_url, "https://img.lightx/u2.png");
        assert_eq!(outcome.result.output_image_url, "https://out/img.jpg");
        // Trois vérifications, chacune précédée d'une attente d'un intervalle
        assert!(start.elapsed() >= POLL_INTERVAL * 3);
    }

    /// Un échec de négociation interrompt tout avant l'initiation du job
    #[tokio::test]
    async fn echec_d_upload_avant_toute_initiation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/uploadImageUrl"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/face-swap"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/order-status"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let service = test_service(&server);
        let error = service
            .swap_faces(&png_image(), &png_image())
            .await
            .unwrap_err();

        assert!(matches!(error, LightxError::UploadNegotiation(_)));
    }

    /// L'échec du job côté fournisseur remonte inchangé à travers la façade
    #[tokio::test]
    async fn echec_du_job_remonte_inchange() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/uploadImageUrl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 2000,
                "body": {
                    "uploadImage": format!("{}/presigned-target", server.uri()),
                    "imageUrl": "https://img.lightx/u1.png",
                }
            })))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("PUT"))
            .and(path("/presigned-target"))
            .respond_with(ResponseTemplate::new(200))
            .expect(2)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/face-swap"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 2000,
                "body": { "orderId": "abc", "maxRetriesAllowed": 5 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/v1/order-status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "statusCode": 2000,
                "body": { "status": "failed" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = test_service(&server);
        let error = service
            .swap_faces(&png_image(), &png_image())
            .await
            .unwrap_err();

        assert!(matches!(error, LightxError::JobFailed));
    }
}
