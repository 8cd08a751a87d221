// utils/config.rs
use dotenv::dotenv;
use serde::Deserialize;
use std::env;

use crate::infrastructure::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Environnement et serveur
    pub run_mode: String,
    pub server_host: String,
    pub server_port: u16,
    pub workers: usize,

    // Base de données
    pub database_url: String,
    pub database_max_connections: u32,

    // API LightX
    pub lightx_api_key: String,
    pub lightx_base_url: String,
    pub lightx_poll_interval_seconds: u64,
    pub lightx_request_timeout_seconds: u64,

    // Limites d'upload
    pub max_image_size_mb: u64,

    // Listing
    pub page_size: i64,

    // Fichiers statiques
    pub static_dir: String,
}

impl Config {
    /// Charger la configuration depuis les variables d'environnement
    pub fn from_env() -> AppResult<Self> {
        // Charger le fichier .env si présent
        let _ = dotenv().ok();

        let config = Config {
            // Environnement et serveur
            run_mode: var_or("RUN_MODE", "development"),
            server_host: var_or("SERVER_HOST", "0.0.0.0"),
            server_port: parse_var("SERVER_PORT", "3000")?,
            workers: parse_var("WORKERS", "4")?,

            // Base de données
            database_url: required_var("DATABASE_URL")?,
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", "10")?,

            // API LightX
            lightx_api_key: required_var("LIGHTX_API_KEY")?,
            lightx_base_url: var_or(
                "LIGHTX_BASE_URL",
                "https://api.lightxeditor.com/external/api",
            ),
            lightx_poll_interval_seconds: parse_var("LIGHTX_POLL_INTERVAL_SECONDS", "3")?,
            lightx_request_timeout_seconds: parse_var("LIGHTX_REQUEST_TIMEOUT_SECONDS", "30")?,

            // Limites d'upload
            max_image_size_mb: parse_var("MAX_IMAGE_SIZE_MB", "2")?,

            // Listing
            page_size: parse_var("PAGE_SIZE", "10")?,

            // Fichiers statiques
            static_dir: var_or("STATIC_DIR", "./static"),
        };

        Ok(config)
    }

    /// Taille maximale d'une image en octets
    pub fn max_image_size_bytes(&self) -> usize {
        (self.max_image_size_mb * 1_000_000) as usize
    }
}

/// Lit une variable requise, erreur descriptive si absente
fn required_var(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| {
        AppError::ConfigurationError(format!(
            "Variable d'environnement requise manquante: {}",
            name
        ))
    })
}

/// Lit une variable avec une valeur par défaut
fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Lit et parse une variable numérique avec une valeur par défaut
fn parse_var<T: std::str::FromStr>(name: &str, default: &str) -> AppResult<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::ConfigurationError(format!("{} must be a number", name)))
}
