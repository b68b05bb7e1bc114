//! Lead scoring and mapping.
//!
//! Turns a raw [`Submission`] into a [`LeadRecord`] ready for the contact store:
//! business type to vertical, bounded lead score, contact name split, and the
//! notes blob carrying assessment context.

use chrono::{DateTime, Utc};

use crate::models::{
    CrimeStats, FacilityDetails, LeadNotes, LeadRecord, Submission, Vertical, LEAD_SOURCE,
};

/// Score used when the form did not carry an overall score.
pub const DEFAULT_BASE_SCORE: f64 = 50.0;
pub const MAX_LEAD_SCORE: f64 = 100.0;
/// Added when the facility reports no current security.
pub const URGENCY_BONUS: f64 = 15.0;
pub const FREQUENT_INCIDENT_BONUS: f64 = 10.0;
pub const REGULAR_INCIDENT_BONUS: f64 = 5.0;
/// Concerns kept in the notes blob.
pub const MAX_NOTE_CONCERNS: usize = 5;

/// Maps and scores a submission, stamping the notes with the current time.
pub fn map_and_score(submission: &Submission, crime_data: Option<&CrimeStats>) -> LeadRecord {
    map_and_score_at(submission, crime_data, Utc::now())
}

/// Same as [`map_and_score`] with an explicit assessment timestamp.
pub fn map_and_score_at(
    submission: &Submission,
    crime_data: Option<&CrimeStats>,
    assessed_at: DateTime<Utc>,
) -> LeadRecord {
    let (first_name, last_name) = split_contact_name(&submission.contact_name);

    let notes = LeadNotes {
        assessment_date: assessed_at,
        overall_score: submission.overall_score,
        top_concerns: submission
            .concerns
            .iter()
            .take(MAX_NOTE_CONCERNS)
            .cloned()
            .collect(),
        facility_details: FacilityDetails {
            sqft: submission.sqft.clone(),
            employees: submission.employees.clone(),
            visitors: submission.visitors.clone(),
            hours: submission.hours.clone(),
            current_security: submission.current_security.clone(),
        },
        crime_data: crime_data.cloned(),
    };

    LeadRecord {
        first_name,
        last_name,
        email: submission.email.clone(),
        phone: submission.phone.clone(),
        company: submission.business_name.clone(),
        title: String::new(),
        vertical: Vertical::from_business_type(&submission.business_type),
        state: submission.state.clone(),
        city: submission.city.clone(),
        source: LEAD_SOURCE.to_string(),
        lead_score: compute_lead_score(
            submission.overall_score,
            submission.current_security.as_deref(),
            submission.incidents.as_deref(),
        ),
        notes,
    }
}

/// Computes the 0-100 sales priority of a lead.
///
/// Only the upper bound is enforced: a negative overall score yields a negative result.
pub fn compute_lead_score(
    overall_score: Option<f64>,
    current_security: Option<&str>,
    incidents: Option<&str>,
) -> i32 {
    let base = overall_score
        .filter(|score| score.is_finite())
        .unwrap_or(DEFAULT_BASE_SCORE)
        .min(MAX_LEAD_SCORE);

    let urgency_bonus = if current_security == Some("none") {
        URGENCY_BONUS
    } else {
        0.0
    };

    let incident_bonus = match incidents {
        Some("frequent") => FREQUENT_INCIDENT_BONUS,
        Some("regular") => REGULAR_INCIDENT_BONUS,
        _ => 0.0,
    };

    (base + urgency_bonus + incident_bonus)
        .min(MAX_LEAD_SCORE)
        .round() as i32
}

/// Splits "Jane Q Doe" into ("Jane", "Q Doe"); a single word has an empty last name.
pub fn split_contact_name(contact_name: &str) -> (String, String) {
    let trimmed = contact_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim_start().to_string()),
        None => (trimmed.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn acme_submission() -> Submission {
        Submission {
            business_name: "Acme Warehousing".to_string(),
            contact_name: "Jane Doe".to_string(),
            email: "jane@acme.test".to_string(),
            phone: "512-555-0100".to_string(),
            city: "Austin".to_string(),
            state: "tx".to_string(),
            business_type: "warehouse".to_string(),
            overall_score: Some(60.0),
            current_security: Some("none".to_string()),
            incidents: Some("regular".to_string()),
            concerns: vec!["theft".to_string(), "vandalism".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_acme_scenario_mapping() {
        let lead = map_and_score(&acme_submission(), None);
        assert_eq!(lead.vertical, Vertical::Logistics);
        assert_eq!(lead.lead_score, 80);
        assert_eq!(lead.first_name, "Jane");
        assert_eq!(lead.last_name, "Doe");
        assert_eq!(lead.company, "Acme Warehousing");
        assert_eq!(lead.source, "assessment");
        assert_eq!(lead.title, "");
        assert!(lead.notes.crime_data.is_none());
    }

    #[test]
    fn test_every_business_type_maps_exactly() {
        for (business_type, expected) in Vertical::BUSINESS_TYPES {
            let submission = Submission {
                business_type: business_type.to_string(),
                ..Default::default()
            };
            assert_eq!(map_and_score(&submission, None).vertical, expected);
        }
    }

    #[test]
    fn test_unknown_business_type_is_other() {
        for business_type in ["", "Warehouse", "spaceport", "office "] {
            assert_eq!(Vertical::from_business_type(business_type), Vertical::Other);
        }
    }

    #[test]
    fn test_missing_score_defaults_to_fifty() {
        assert_eq!(compute_lead_score(None, None, None), 50);
        assert_eq!(compute_lead_score(None, Some("none"), None), 65);
    }

    #[test]
    fn test_bonuses() {
        assert_eq!(compute_lead_score(Some(40.0), Some("none"), None), 55);
        assert_eq!(compute_lead_score(Some(40.0), Some("guards"), None), 40);
        assert_eq!(compute_lead_score(Some(40.0), None, Some("frequent")), 50);
        assert_eq!(compute_lead_score(Some(40.0), None, Some("regular")), 45);
        assert_eq!(compute_lead_score(Some(40.0), None, Some("rare")), 40);
        assert_eq!(
            compute_lead_score(Some(40.0), Some("none"), Some("frequent")),
            65
        );
    }

    #[test]
    fn test_score_clamped_at_100() {
        assert_eq!(compute_lead_score(Some(250.0), None, None), 100);
        assert_eq!(
            compute_lead_score(Some(95.0), Some("none"), Some("frequent")),
            100
        );
    }

    #[test]
    fn test_negative_score_is_not_floored() {
        assert_eq!(compute_lead_score(Some(-30.0), None, None), -30);
    }

    #[test]
    fn test_split_contact_name() {
        assert_eq!(
            split_contact_name("Jane Doe"),
            ("Jane".to_string(), "Doe".to_string())
        );
        assert_eq!(
            split_contact_name("Mary Ann Smith"),
            ("Mary".to_string(), "Ann Smith".to_string())
        );
        assert_eq!(
            split_contact_name("Prince"),
            ("Prince".to_string(), String::new())
        );
        assert_eq!(split_contact_name(""), (String::new(), String::new()));
    }

    #[test]
    fn test_notes_blob_contents() {
        let assessed_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let submission = Submission {
            concerns: (1..=7).map(|i| format!("concern {}", i)).collect(),
            sqft: Some(json!(25000)),
            employees: Some(json!("50-100")),
            hours: Some(json!("24/7")),
            current_security: Some("cameras".to_string()),
            overall_score: Some(72.0),
            ..Default::default()
        };
        let crime = CrimeStats {
            year: Some(2022),
            property_crime_rate: 30.0,
            violent_crime_rate: 0.0,
            burglary_rate: 0.0,
            larceny_rate: 0.0,
            motor_vehicle_theft_rate: 0.0,
            aggravated_assault_rate: 0.0,
            robbery_rate: 0.0,
        };

        let lead = map_and_score_at(&submission, Some(&crime), assessed_at);
        let notes = serde_json::to_value(&lead.notes).unwrap();

        assert_eq!(notes["assessmentDate"], "2024-05-01T12:00:00Z");
        assert_eq!(notes["overallScore"], 72.0);
        assert_eq!(notes["topConcerns"].as_array().unwrap().len(), 5);
        assert_eq!(notes["topConcerns"][4], "concern 5");
        assert_eq!(notes["facilityDetails"]["sqft"], 25000);
        assert_eq!(notes["facilityDetails"]["employees"], "50-100");
        assert_eq!(notes["facilityDetails"]["visitors"], serde_json::Value::Null);
        assert_eq!(notes["facilityDetails"]["currentSecurity"], "cameras");
        assert_eq!(notes["crimeData"]["year"], 2022);
        assert_eq!(notes["crimeData"]["property_crime_rate"], 30.0);
    }

    #[test]
    fn test_notes_blob_with_absent_crime_data() {
        let lead = map_and_score(&Submission::default(), None);
        let notes = serde_json::to_value(&lead.notes).unwrap();
        assert!(notes["crimeData"].is_null());
        assert!(notes["overallScore"].is_null());
    }
}
