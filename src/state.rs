use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::warn;

use crate::accused::repo::{AccusedStore, PgAccusedStore};
use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::geocode::{DisabledGeocoder, Geocoder, OpenCageClient};
use crate::photos::store::{FsPhotoStore, PhotoStore};

/// Shared application state. Every external collaborator sits behind a
/// trait object so tests can swap in in-memory implementations.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub accused: Arc<dyn AccusedStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub photos: Arc<dyn PhotoStore>,
}

impl AppState {
    /// Production wiring: Postgres stores, the OpenCage client, and a
    /// filesystem photo store rooted at the configured uploads directory.
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        // Run migrations if present
        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }

        let geocoder: Arc<dyn Geocoder> = if config.geocoder.api_key.is_empty() {
            warn!("OPENCAGE_API_KEY not set; records will be stored without coordinates");
            Arc::new(DisabledGeocoder)
        } else {
            Arc::new(OpenCageClient::new(&config.geocoder)?)
        };

        Ok(Self {
            users: Arc::new(PgUserStore::new(db.clone())),
            accused: Arc::new(PgAccusedStore::new(db)),
            geocoder,
            photos: Arc::new(FsPhotoStore::new(config.photos.uploads_dir.clone())),
            config,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        accused: Arc<dyn AccusedStore>,
        geocoder: Arc<dyn Geocoder>,
        photos: Arc<dyn PhotoStore>,
    ) -> Self {
        Self {
            config,
            users,
            accused,
            geocoder,
            photos,
        }
    }
}
