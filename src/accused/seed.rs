use crate::accused::dto::AccusedInput;

fn sample(
    full_name: &str,
    phones: &[&str],
    address: &str,
    fraud_amount: f64,
    case_id: &str,
    fir_details: &str,
    police_station: &str,
    tags: &[&str],
) -> AccusedInput {
    AccusedInput {
        full_name: full_name.into(),
        phone_numbers: phones.iter().map(|s| s.to_string()).collect(),
        address: address.into(),
        fraud_amount,
        case_id: case_id.into(),
        fir_details: fir_details.into(),
        police_station: police_station.into(),
        tags: tags.iter().map(|s| s.to_string()).collect(),
        profile_photo: None,
        latitude: None,
        longitude: None,
        manual_coordinates: false,
    }
}

/// Sample Indian fraud case data for demos and manual testing.
pub fn sample_records() -> Vec<AccusedInput> {
    vec![
        sample(
            "Rajesh Kumar Singh",
            &["+91-9876543210", "+91-8765432109"],
            "Plot 123, Connaught Place, New Delhi, Delhi 110001",
            250000.0,
            "FIR/2024/001",
            "Cheating and criminal breach of trust under sections 420, 406 IPC",
            "Connaught Place Police Station, New Delhi",
            &["loan fraud", "fake documents"],
        ),
        sample(
            "Priya Sharma",
            &["+91-9123456789"],
            "B-45, Banjara Hills, Hyderabad, Telangana 500034",
            180000.0,
            "FIR/2024/002",
            "Online investment fraud under IT Act and IPC 420",
            "Banjara Hills Police Station, Hyderabad",
            &["crypto scam", "investment fraud"],
        ),
        sample(
            "Mohammed Ali Khan",
            &["+91-9898989898", "+91-9797979797"],
            "456, MG Road, Bengaluru, Karnataka 560001",
            500000.0,
            "FIR/2024/003",
            "Bank fraud and forgery under sections 420, 468, 471 IPC",
            "MG Road Police Station, Bengaluru",
            &["bank fraud", "forgery"],
        ),
        sample(
            "Anita Gupta",
            &["+91-9555666777"],
            "C-78, Sector 15, Noida, Uttar Pradesh 201301",
            75000.0,
            "FIR/2024/004",
            "Credit card fraud under sections 420, 468 IPC",
            "Sector 20 Police Station, Noida",
            &["credit card fraud", "identity theft"],
        ),
        sample(
            "Vikram Choudhary",
            &["+91-9111222333"],
            "Plot 89, Linking Road, Bandra West, Mumbai, Maharashtra 400050",
            320000.0,
            "FIR/2024/005",
            "Real estate fraud under sections 420, 506 IPC",
            "Bandra Police Station, Mumbai",
            &["real estate fraud", "cheating"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accused::services::validate;

    #[test]
    fn seed_records_are_valid_and_sum_as_documented() {
        let records = sample_records();
        assert_eq!(records.len(), 5);
        let total: f64 = records.iter().map(|r| r.fraud_amount).sum();
        assert_eq!(total, 1_325_000.0);
        for record in &records {
            validate(record).expect("seed record should pass validation");
        }
    }
}
