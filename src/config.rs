use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub api_key: String,
    /// ISO 3166-1 alpha-2 bias passed to OpenCage, fixed per deployment.
    pub country_code: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct PhotoConfig {
    pub uploads_dir: PathBuf,
    /// Public prefix under which the uploads directory is served.
    pub public_base: String,
}

#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub superadmin_username: String,
    pub superadmin_password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub geocoder: GeocoderConfig,
    pub photos: PhotoConfig,
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "maptheaccused".into()),
            audience: std::env::var("JWT_AUDIENCE")
                .unwrap_or_else(|_| "maptheaccused-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let geocoder = GeocoderConfig {
            api_key: std::env::var("OPENCAGE_API_KEY").unwrap_or_default(),
            country_code: std::env::var("GEOCODER_COUNTRY").unwrap_or_else(|_| "in".into()),
            timeout_secs: std::env::var("GEOCODER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(10),
        };
        let photos = PhotoConfig {
            uploads_dir: std::env::var("UPLOADS_DIR")
                .unwrap_or_else(|_| "uploads".into())
                .into(),
            public_base: "/uploads".into(),
        };
        let bootstrap = BootstrapConfig {
            superadmin_username: std::env::var("SUPERADMIN_USERNAME")
                .unwrap_or_else(|_| "admin".into()),
            superadmin_password: std::env::var("SUPERADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".into()),
        };
        Ok(Self {
            database_url,
            jwt,
            geocoder,
            photos,
            bootstrap,
        })
    }
}
