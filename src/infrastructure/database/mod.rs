pub mod submissions;

pub use submissions::SubmissionsRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::{Error as SqlxError, Pool, Postgres};
use tracing::info;

/// Gestion de la connexion à la base de données
#[derive(Clone)]
pub struct Database {
    pub pool: Pool<Postgres>,
}

impl Database {
    /// Crée une nouvelle connexion à la base de données
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, SqlxError> {
        info!("🔌 Connexion à la base de données PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        info!("✅ Connexion établie avec succès");

        Ok(Self { pool })
    }

    /// Applique les migrations embarquées au démarrage
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("📦 Application des migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}
