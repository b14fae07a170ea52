use std::collections::BTreeMap;

use crate::accused::dto::{AccusedInput, CityStat, SearchRequest, StatsResponse, TagCount};
use crate::accused::repo::AccusedRecord;
use crate::error::ApiError;

const TOP_FRAUD_TYPES_LIMIT: usize = 5;
const CITY_STATS_LIMIT: usize = 10;

/// Field-level validation, shared by create and update.
pub fn validate(input: &AccusedInput) -> Result<(), ApiError> {
    if input.full_name.trim().is_empty() {
        return Err(ApiError::validation("full_name must not be empty"));
    }
    if !input.phone_numbers.iter().any(|p| !p.trim().is_empty()) {
        return Err(ApiError::validation(
            "at least one phone number is required",
        ));
    }
    if input.address.trim().is_empty() {
        return Err(ApiError::validation("address must not be empty"));
    }
    if !input.fraud_amount.is_finite() || input.fraud_amount < 0.0 {
        return Err(ApiError::validation("fraud_amount must be non-negative"));
    }
    if input.case_id.trim().is_empty() {
        return Err(ApiError::validation("case_id must not be empty"));
    }
    if input.fir_details.trim().is_empty() {
        return Err(ApiError::validation("fir_details must not be empty"));
    }
    if input.police_station.trim().is_empty() {
        return Err(ApiError::validation("police_station must not be empty"));
    }
    if input.latitude.is_some() != input.longitude.is_some() {
        return Err(ApiError::validation(
            "latitude and longitude must be supplied together",
        ));
    }
    if input.manual_coordinates && input.latitude.is_none() {
        return Err(ApiError::validation(
            "manual_coordinates requires latitude and longitude",
        ));
    }
    Ok(())
}

/// Decision table for coordinate enrichment. On create (`old` is None) any
/// non-manual record is geocoded; on update only when the address changed
/// or the stored coordinates are absent. Manual coordinates are never
/// geocoded.
pub fn should_geocode(old: Option<&AccusedRecord>, input: &AccusedInput) -> bool {
    if input.manual_coordinates {
        return false;
    }
    match old {
        None => true,
        Some(old) => old.address != input.address || old.latitude.is_none(),
    }
}

/// Which field(s) a search query runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    All,
    Name,
    Phone,
    Address,
    CaseId,
}

impl SearchScope {
    /// An unknown selector falls back to the all-fields search rather than
    /// erroring, matching the deployed behavior clients rely on.
    pub fn parse(selector: Option<&str>) -> Self {
        match selector.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("name") => SearchScope::Name,
            Some("phone") => SearchScope::Phone,
            Some("address") => SearchScope::Address,
            Some("case_id") => SearchScope::CaseId,
            _ => SearchScope::All,
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Case-insensitive substring match of `query` against the scoped fields.
/// `query` must already be trimmed and lowercased; an empty query matches
/// every record by contract.
pub fn matches_scope(record: &AccusedRecord, scope: SearchScope, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let phones = |r: &AccusedRecord| r.phone_numbers.iter().any(|p| contains_ci(p, query));
    match scope {
        SearchScope::Name => contains_ci(&record.full_name, query),
        SearchScope::Phone => phones(record),
        SearchScope::Address => contains_ci(&record.address, query),
        SearchScope::CaseId => contains_ci(&record.case_id, query),
        SearchScope::All => {
            contains_ci(&record.full_name, query)
                || phones(record)
                || contains_ci(&record.address, query)
                || contains_ci(&record.case_id, query)
        }
    }
}

/// Post-filters: minimum fraud amount (inclusive), locality substring
/// against address or police station, tag substring against any tag.
/// Independent and AND-composed.
pub fn passes_filters(record: &AccusedRecord, request: &SearchRequest) -> bool {
    if let Some(min) = request.min_amount {
        if record.fraud_amount < min {
            return false;
        }
    }
    if let Some(locality) = request.locality.as_deref() {
        let locality = locality.trim().to_lowercase();
        if !locality.is_empty()
            && !contains_ci(&record.address, &locality)
            && !contains_ci(&record.police_station, &locality)
        {
            return false;
        }
    }
    if let Some(tag) = request.tag.as_deref() {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !record.tags.iter().any(|t| contains_ci(t, &tag)) {
            return false;
        }
    }
    true
}

/// Runs the whole search pipeline over a scanned record list.
pub fn run_search(records: Vec<AccusedRecord>, request: &SearchRequest) -> Vec<AccusedRecord> {
    let scope = SearchScope::parse(request.search_type.as_deref());
    let query = request.query.trim().to_lowercase();
    records
        .into_iter()
        .filter(|r| matches_scope(r, scope, &query) && passes_filters(r, request))
        .collect()
}

/// Read-side aggregation for the dashboard, recomputed per call. Grouping
/// keys are the tag and police-station strings exactly as recorded. Sorted
/// by count descending with ties broken by key so the output is
/// deterministic.
pub fn compute_stats(records: &[AccusedRecord]) -> StatsResponse {
    let total_fraud_amount = records.iter().map(|r| r.fraud_amount).sum();

    let mut tag_counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        for tag in &record.tags {
            *tag_counts.entry(tag.as_str()).or_default() += 1;
        }
    }
    let mut top_fraud_types: Vec<TagCount> = tag_counts
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();
    top_fraud_types.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    top_fraud_types.truncate(TOP_FRAUD_TYPES_LIMIT);

    let mut cities: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
    for record in records {
        let entry = cities.entry(record.police_station.as_str()).or_default();
        entry.0 += 1;
        entry.1 += record.fraud_amount;
    }
    let mut city_stats: Vec<CityStat> = cities
        .into_iter()
        .map(|(locality, (count, total_amount))| CityStat {
            locality: locality.to_string(),
            count,
            total_amount,
        })
        .collect();
    city_stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.locality.cmp(&b.locality))
    });
    city_stats.truncate(CITY_STATS_LIMIT);

    StatsResponse {
        total_accused: records.len() as u64,
        total_fraud_amount,
        top_fraud_types,
        city_stats,
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;
    use uuid::Uuid;

    use super::*;

    fn valid_input() -> AccusedInput {
        AccusedInput {
            full_name: "Rajesh Kumar Singh".into(),
            phone_numbers: vec!["+91-9876543210".into()],
            address: "Connaught Place, New Delhi".into(),
            fraud_amount: 250000.0,
            case_id: "FIR/2024/001".into(),
            fir_details: "420 IPC".into(),
            police_station: "Connaught Place Police Station".into(),
            tags: vec!["loan fraud".into()],
            profile_photo: None,
            latitude: None,
            longitude: None,
            manual_coordinates: false,
        }
    }

    fn record_from(input: &AccusedInput) -> AccusedRecord {
        AccusedRecord {
            accused_id: Uuid::new_v4(),
            full_name: input.full_name.clone(),
            phone_numbers: input.phone_numbers.clone(),
            address: input.address.clone(),
            fraud_amount: input.fraud_amount,
            case_id: input.case_id.clone(),
            fir_details: input.fir_details.clone(),
            police_station: input.police_station.clone(),
            tags: input.tags.clone(),
            profile_photo: None,
            latitude: input.latitude,
            longitude: input.longitude,
            manual_coordinates: input.manual_coordinates,
            created_at: OffsetDateTime::now_utc(),
            created_by: "tester".into(),
            updated_at: None,
            updated_by: None,
        }
    }

    #[test]
    fn validation_accepts_a_complete_input() {
        assert!(validate(&valid_input()).is_ok());
    }

    #[test]
    fn validation_rejects_missing_required_fields() {
        for mutate in [
            (|i: &mut AccusedInput| i.full_name = "  ".into()) as fn(&mut AccusedInput),
            |i| i.phone_numbers = vec![],
            |i| i.phone_numbers = vec!["".into(), "  ".into()],
            |i| i.address = "".into(),
            |i| i.fraud_amount = -1.0,
            |i| i.fraud_amount = f64::NAN,
            |i| i.case_id = "".into(),
            |i| i.fir_details = "".into(),
            |i| i.police_station = "".into(),
        ] {
            let mut input = valid_input();
            mutate(&mut input);
            assert!(validate(&input).is_err());
        }
    }

    #[test]
    fn validation_requires_paired_coordinates() {
        let mut input = valid_input();
        input.latitude = Some(28.6);
        assert!(validate(&input).is_err());
        input.longitude = Some(77.2);
        assert!(validate(&input).is_ok());

        let mut manual = valid_input();
        manual.manual_coordinates = true;
        assert!(validate(&manual).is_err());
        manual.latitude = Some(28.6);
        manual.longitude = Some(77.2);
        assert!(validate(&manual).is_ok());
    }

    #[test]
    fn create_geocodes_unless_manual() {
        let input = valid_input();
        assert!(should_geocode(None, &input));

        let mut manual = valid_input();
        manual.manual_coordinates = true;
        manual.latitude = Some(28.6);
        manual.longitude = Some(77.2);
        assert!(!should_geocode(None, &manual));
    }

    #[test]
    fn update_geocodes_only_on_address_change_or_missing_coords() {
        let input = valid_input();
        let mut old = record_from(&input);
        old.latitude = Some(28.6);
        old.longitude = Some(77.2);

        // Address unchanged, coordinates present: leave them alone.
        assert!(!should_geocode(Some(&old), &input));

        // Address changed: re-geocode.
        let mut moved = input.clone();
        moved.address = "MG Road, Bengaluru".into();
        assert!(should_geocode(Some(&old), &moved));

        // Coordinates were never resolved: try again.
        let mut unresolved = old.clone();
        unresolved.latitude = None;
        unresolved.longitude = None;
        assert!(should_geocode(Some(&unresolved), &input));

        // Manual coordinates win over everything.
        let mut manual = moved.clone();
        manual.manual_coordinates = true;
        manual.latitude = Some(12.9);
        manual.longitude = Some(77.5);
        assert!(!should_geocode(Some(&old), &manual));
    }

    #[test]
    fn scope_parsing_falls_back_to_all() {
        assert_eq!(SearchScope::parse(Some("name")), SearchScope::Name);
        assert_eq!(SearchScope::parse(Some("Phone")), SearchScope::Phone);
        assert_eq!(SearchScope::parse(Some("case_id")), SearchScope::CaseId);
        assert_eq!(SearchScope::parse(Some("everything")), SearchScope::All);
        assert_eq!(SearchScope::parse(None), SearchScope::All);
    }

    #[test]
    fn scoped_search_is_restricted_to_one_field() {
        let mut input = valid_input();
        input.full_name = "Priya Sharma".into();
        input.address = "Banjara Hills, Hyderabad".into();
        let record = record_from(&input);

        // Matches in the address only; a name-scoped search must miss it.
        assert!(!matches_scope(&record, SearchScope::Name, "hyderabad"));
        assert!(matches_scope(&record, SearchScope::Address, "hyderabad"));
        assert!(matches_scope(&record, SearchScope::All, "hyderabad"));

        assert!(matches_scope(&record, SearchScope::Name, "priya"));
        assert!(matches_scope(&record, SearchScope::Phone, "98765"));
        assert!(matches_scope(&record, SearchScope::CaseId, "fir/2024"));
    }

    #[test]
    fn all_scope_does_not_match_tags() {
        let mut input = valid_input();
        input.tags = vec!["crypto scam".into()];
        let record = record_from(&input);
        assert!(!matches_scope(&record, SearchScope::All, "crypto"));
    }

    #[test]
    fn empty_query_matches_everything() {
        let record = record_from(&valid_input());
        assert!(matches_scope(&record, SearchScope::Name, ""));
        assert!(matches_scope(&record, SearchScope::All, ""));
    }

    #[test]
    fn post_filters_compose_with_and_semantics() {
        let mut input = valid_input();
        input.fraud_amount = 100000.0;
        input.tags = vec!["Bank Fraud".into()];
        let record = record_from(&input);

        let mut request = SearchRequest {
            query: "".into(),
            search_type: None,
            min_amount: Some(100000.0),
            locality: Some("delhi".into()),
            tag: Some("bank".into()),
        };
        assert!(passes_filters(&record, &request));

        // min_amount is inclusive; one above the amount fails.
        request.min_amount = Some(100000.01);
        assert!(!passes_filters(&record, &request));

        request.min_amount = Some(0.0);
        request.locality = Some("mumbai".into());
        assert!(!passes_filters(&record, &request));

        // Locality may also match the police station.
        request.locality = Some("connaught place police".into());
        assert!(passes_filters(&record, &request));

        request.tag = Some("crypto".into());
        assert!(!passes_filters(&record, &request));
    }

    #[test]
    fn stats_sum_counts_and_order() {
        let mut records = Vec::new();
        for (name, station, amount, tags) in [
            ("a", "PS One", 100.0, vec!["loan fraud"]),
            ("b", "PS One", 200.0, vec!["loan fraud", "forgery"]),
            ("c", "PS Two", 300.0, vec!["forgery"]),
        ] {
            let mut input = valid_input();
            input.full_name = name.into();
            input.police_station = station.into();
            input.fraud_amount = amount;
            input.tags = tags.into_iter().map(String::from).collect();
            records.push(record_from(&input));
        }

        let stats = compute_stats(&records);
        assert_eq!(stats.total_accused, 3);
        assert_eq!(stats.total_fraud_amount, 600.0);
        // Both tags appear twice; the tie breaks alphabetically.
        assert_eq!(
            stats.top_fraud_types,
            vec![
                TagCount {
                    tag: "forgery".into(),
                    count: 2
                },
                TagCount {
                    tag: "loan fraud".into(),
                    count: 2
                },
            ]
        );
        assert_eq!(
            stats.city_stats,
            vec![
                CityStat {
                    locality: "PS One".into(),
                    count: 2,
                    total_amount: 300.0
                },
                CityStat {
                    locality: "PS Two".into(),
                    count: 1,
                    total_amount: 300.0
                },
            ]
        );
    }

    #[test]
    fn stats_respect_the_group_limits() {
        let mut records = Vec::new();
        for i in 0..12 {
            let mut input = valid_input();
            input.police_station = format!("PS {i:02}");
            input.tags = vec![format!("tag {i:02}")];
            records.push(record_from(&input));
        }
        let stats = compute_stats(&records);
        assert_eq!(stats.top_fraud_types.len(), 5);
        assert_eq!(stats.city_stats.len(), 10);
    }

    #[test]
    fn stats_on_empty_store_are_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_accused, 0);
        assert_eq!(stats.total_fraud_amount, 0.0);
        assert!(stats.top_fraud_types.is_empty());
        assert!(stats.city_stats.is_empty());
    }
}
