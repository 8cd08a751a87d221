use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use std::env;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use faceswap_platform::api;
use faceswap_platform::core::faceswap_service::FaceSwapService;
use faceswap_platform::infrastructure::database::Database;
use faceswap_platform::services::lightx::LightxClient;
use faceswap_platform::utils::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialisation du logging
    setup_tracing();
    info!("🚀 Démarrage de la plateforme Face Swap");

    // Chargement de la configuration
    let config = Config::from_env().expect("❌ Impossible de charger la configuration");
    info!("✅ Configuration chargée avec succès");
    info!("🔧 Mode: {}", config.run_mode);

    // Initialisation des services
    let db = Database::new(&config.database_url, config.database_max_connections)
        .await
        .expect("❌ Impossible de se connecter à la base de données");
    db.run_migrations()
        .await
        .expect("❌ Impossible d'appliquer les migrations");

    let lightx = LightxClient::new(
        config.lightx_base_url.clone(),
        config.lightx_api_key.clone(),
        Duration::from_secs(config.lightx_poll_interval_seconds),
        Duration::from_secs(config.lightx_request_timeout_seconds),
    );
    let faceswap = FaceSwapService::new(lightx);

    let server_host = config.server_host.clone();
    let server_port = config.server_port;
    let workers = config.workers;
    let static_dir = config.static_dir.clone();

    let app_config = web::Data::new(config);
    let app_db = web::Data::new(db);
    let app_faceswap = web::Data::new(faceswap);

    // Configuration du serveur Actix-Web
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(app_config.clone())
            .app_data(app_db.clone())
            .app_data(app_faceswap.clone())
            .configure(api::config)
            .service(actix_files::Files::new("/", static_dir.clone()).index_file("index.html"))
            .default_service(web::route().to(not_found))
    })
    .bind((server_host.as_str(), server_port))?
    .workers(workers)
    .shutdown_timeout(10);

    info!("✅ Backend démarré avec succès!");
    info!(
        "🔗 API disponible sur http://{}:{}",
        server_host, server_port
    );

    server.run().await
}

/// Réponse JSON pour les routes inconnues
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "Not Found",
        "code": 404,
    }))
}

/// Configure le tracing pour le logging structuré
fn setup_tracing() {
    let log_level = env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(tracing::Level::INFO);

    let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".into());

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(log_level.into()),
        )
        .with(if log_format == "json" {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        } else {
            Box::new(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_line_number(true)
                    .with_file(true),
            ) as Box<dyn tracing_subscriber::Layer<_> + Send + Sync>
        });

    subscriber.init();
}
