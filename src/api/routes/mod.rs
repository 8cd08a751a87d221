use actix_web::{web, HttpResponse, Responder};

pub mod submissions;

/// Enregistre toutes les routes de l'application
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Routes des soumissions de face swap
            .service(submissions::create_submission)
            .service(submissions::list_submissions)
            .service(submissions::get_submission),
    );

    // Routes publiques
    cfg.service(web::resource("/health").route(web::get().to(health_check)));
}

/// Endpoint de santé pour les probes Kubernetes/Docker
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
