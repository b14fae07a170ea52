use axum::async_trait;

pub mod opencage;

pub use opencage::OpenCageClient;

/// A point on the map, as returned by forward geocoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Forward-geocoding capability. `Ok(None)` means the service answered but
/// had no match for the address; `Err` covers transport failures and
/// timeouts. Callers treat both the same way: the record proceeds without
/// coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> anyhow::Result<Option<Coordinates>>;
}

/// Stand-in used when no API key is configured: every lookup is a miss, so
/// records are stored without coordinates instead of erroring on the wire.
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _address: &str) -> anyhow::Result<Option<Coordinates>> {
        Ok(None)
    }
}
