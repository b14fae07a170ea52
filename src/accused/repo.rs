use axum::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A case-linked subject profile. `accused_id` is generated by the
/// application at creation, not by the storage engine, so it stays stable
/// across export/import.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccusedRecord {
    pub accused_id: Uuid,
    pub full_name: String,
    pub phone_numbers: Vec<String>,
    pub address: String,
    pub fraud_amount: f64,
    pub case_id: String,
    pub fir_details: String,
    pub police_station: String,
    pub tags: Vec<String>,
    pub profile_photo: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// True when the operator supplied the coordinates by hand; such
    /// records are never geocoded.
    pub manual_coordinates: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
    pub updated_by: Option<String>,
}

/// Persistence for accused records: insert, point lookup, full scan in
/// creation order, full replace, delete. Matching and aggregation live
/// outside the store, in pure functions over the scanned list, so the
/// Postgres and in-memory backends cannot drift on semantics.
#[async_trait]
pub trait AccusedStore: Send + Sync {
    async fn insert(&self, record: &AccusedRecord) -> anyhow::Result<()>;
    async fn get(&self, accused_id: Uuid) -> anyhow::Result<Option<AccusedRecord>>;
    async fn list(&self) -> anyhow::Result<Vec<AccusedRecord>>;
    /// Full replace of the row with the same `accused_id`. Returns false
    /// when no such record exists.
    async fn replace(&self, record: &AccusedRecord) -> anyhow::Result<bool>;
    /// Returns false when no record with that id existed.
    async fn delete(&self, accused_id: Uuid) -> anyhow::Result<bool>;
    /// Removes every record; used by the seed endpoint.
    async fn clear(&self) -> anyhow::Result<()>;
}

const ALL_COLUMNS: &str = "accused_id, full_name, phone_numbers, address, fraud_amount, \
     case_id, fir_details, police_station, tags, profile_photo, latitude, longitude, \
     manual_coordinates, created_at, created_by, updated_at, updated_by";

pub struct PgAccusedStore {
    pool: PgPool,
}

impl PgAccusedStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccusedStore for PgAccusedStore {
    async fn insert(&self, record: &AccusedRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accused (accused_id, full_name, phone_numbers, address, fraud_amount,
                                 case_id, fir_details, police_station, tags, profile_photo,
                                 latitude, longitude, manual_coordinates, created_at, created_by,
                                 updated_at, updated_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(record.accused_id)
        .bind(&record.full_name)
        .bind(&record.phone_numbers)
        .bind(&record.address)
        .bind(record.fraud_amount)
        .bind(&record.case_id)
        .bind(&record.fir_details)
        .bind(&record.police_station)
        .bind(&record.tags)
        .bind(&record.profile_photo)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.manual_coordinates)
        .bind(record.created_at)
        .bind(&record.created_by)
        .bind(record.updated_at)
        .bind(&record.updated_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, accused_id: Uuid) -> anyhow::Result<Option<AccusedRecord>> {
        let record = sqlx::query_as::<_, AccusedRecord>(&format!(
            "SELECT {ALL_COLUMNS} FROM accused WHERE accused_id = $1"
        ))
        .bind(accused_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list(&self) -> anyhow::Result<Vec<AccusedRecord>> {
        // The internal serial key preserves insertion order.
        let records = sqlx::query_as::<_, AccusedRecord>(&format!(
            "SELECT {ALL_COLUMNS} FROM accused ORDER BY id ASC"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn replace(&self, record: &AccusedRecord) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accused
            SET full_name = $2, phone_numbers = $3, address = $4, fraud_amount = $5,
                case_id = $6, fir_details = $7, police_station = $8, tags = $9,
                profile_photo = $10, latitude = $11, longitude = $12,
                manual_coordinates = $13, updated_at = $14, updated_by = $15
            WHERE accused_id = $1
            "#,
        )
        .bind(record.accused_id)
        .bind(&record.full_name)
        .bind(&record.phone_numbers)
        .bind(&record.address)
        .bind(record.fraud_amount)
        .bind(&record.case_id)
        .bind(&record.fir_details)
        .bind(&record.police_station)
        .bind(&record.tags)
        .bind(&record.profile_photo)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.manual_coordinates)
        .bind(record.updated_at)
        .bind(&record.updated_by)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, accused_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM accused WHERE accused_id = $1")
            .bind(accused_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM accused")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// In-memory record store backing tests and local development. Keeps
/// records in insertion order, like the serial-keyed table.
#[derive(Default)]
pub struct MemoryAccusedStore {
    records: RwLock<Vec<AccusedRecord>>,
}

impl MemoryAccusedStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccusedStore for MemoryAccusedStore {
    async fn insert(&self, record: &AccusedRecord) -> anyhow::Result<()> {
        self.records.write().await.push(record.clone());
        Ok(())
    }

    async fn get(&self, accused_id: Uuid) -> anyhow::Result<Option<AccusedRecord>> {
        Ok(self
            .records
            .read()
            .await
            .iter()
            .find(|r| r.accused_id == accused_id)
            .cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<AccusedRecord>> {
        Ok(self.records.read().await.clone())
    }

    async fn replace(&self, record: &AccusedRecord) -> anyhow::Result<bool> {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.accused_id == record.accused_id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, accused_id: Uuid) -> anyhow::Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.accused_id != accused_id);
        Ok(records.len() < before)
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.records.write().await.clear();
        Ok(())
    }
}
