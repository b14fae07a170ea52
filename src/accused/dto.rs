use serde::{Deserialize, Serialize};

/// Request body shared by create and update. Update is a full replace of
/// the mutable fields, so the two operations take the same shape.
#[derive(Debug, Clone, Deserialize)]
pub struct AccusedInput {
    pub full_name: String,
    pub phone_numbers: Vec<String>,
    pub address: String,
    pub fraud_amount: f64,
    pub case_id: String,
    pub fir_details: String,
    pub police_station: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub profile_photo: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub manual_coordinates: bool,
}

/// Free-text search plus optional post-filters, AND-composed.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub search_type: Option<String>,
    #[serde(default)]
    pub min_amount: Option<f64>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityStat {
    pub locality: String,
    pub count: u64,
    pub total_amount: f64,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_accused: u64,
    pub total_fraud_amount: f64,
    pub top_fraud_types: Vec<TagCount>,
    pub city_stats: Vec<CityStat>,
}
