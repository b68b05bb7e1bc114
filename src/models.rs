use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use std::fmt;

/// Source tag written on every lead created by this service.
pub const LEAD_SOURCE: &str = "assessment";

// ============ Inbound ============

/// Security assessment form submission.
///
/// Every field is optional on the wire. Absent or `null` values fall back to neutral
/// defaults so that scoring never fails on a structurally valid body.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Submission {
    #[serde(deserialize_with = "null_as_default")]
    pub business_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub contact_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
    /// Free text from the client-side business type picker.
    #[serde(deserialize_with = "null_as_default")]
    pub business_type: String,
    /// Externally computed assessment score. Numeric strings are accepted.
    #[serde(deserialize_with = "lenient_score")]
    pub overall_score: Option<f64>,
    pub current_security: Option<String>,
    /// Incident frequency category ("frequent", "regular", ...).
    pub incidents: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub concerns: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_test: bool,
    // Facility details are copied verbatim into the notes blob.
    pub sqft: Option<Value>,
    pub employees: Option<Value>,
    pub visitors: Option<Value>,
    pub hours: Option<Value>,
}

/// Reads `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a score given as a number or a numeric string.
///
/// Strings that do not parse as a number count as no score.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawScore {
        Number(f64),
        Text(String),
    }

    Ok(match Option::<RawScore>::deserialize(deserializer)? {
        Some(RawScore::Number(n)) => Some(n),
        Some(RawScore::Text(s)) => s.trim().parse::<f64>().ok(),
        None => None,
    })
}

// ============ Crime Data ============

/// Regional crime rates for the most recent year reported by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeStats {
    pub year: Option<i64>,
    pub property_crime_rate: f64,
    pub violent_crime_rate: f64,
    pub burglary_rate: f64,
    pub larceny_rate: f64,
    pub motor_vehicle_theft_rate: f64,
    pub aggravated_assault_rate: f64,
    pub robbery_rate: f64,
}

// ============ Leads ============

/// CRM vertical a lead is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vertical {
    Logistics,
    CommercialRe,
    Retail,
    Healthcare,
    Construction,
    Hoa,
    Events,
    Education,
    Hospitality,
    Manufacturing,
    Government,
    Financial,
    Other,
}

impl Vertical {
    /// Business types offered by the assessment form and the vertical each one maps to.
    pub const BUSINESS_TYPES: [(&'static str, Vertical); 12] = [
        ("warehouse", Vertical::Logistics),
        ("office", Vertical::CommercialRe),
        ("retail", Vertical::Retail),
        ("healthcare", Vertical::Healthcare),
        ("construction", Vertical::Construction),
        ("residential", Vertical::Hoa),
        ("events", Vertical::Events),
        ("education", Vertical::Education),
        ("hospitality", Vertical::Hospitality),
        ("manufacturing", Vertical::Manufacturing),
        ("government", Vertical::Government),
        ("financial", Vertical::Financial),
    ];

    /// Exact-match lookup; anything unknown is filed under `Other`.
    pub fn from_business_type(business_type: &str) -> Self {
        Self::BUSINESS_TYPES
            .iter()
            .find(|(name, _)| *name == business_type)
            .map(|(_, vertical)| *vertical)
            .unwrap_or(Vertical::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Vertical::Logistics => "logistics",
            Vertical::CommercialRe => "commercial_re",
            Vertical::Retail => "retail",
            Vertical::Healthcare => "healthcare",
            Vertical::Construction => "construction",
            Vertical::Hoa => "hoa",
            Vertical::Events => "events",
            Vertical::Education => "education",
            Vertical::Hospitality => "hospitality",
            Vertical::Manufacturing => "manufacturing",
            Vertical::Government => "government",
            Vertical::Financial => "financial",
            Vertical::Other => "other",
        }
    }

    /// Parses the stored column value back into a vertical.
    pub fn from_stored(value: &str) -> Self {
        match value {
            "logistics" => Vertical::Logistics,
            "commercial_re" => Vertical::CommercialRe,
            "retail" => Vertical::Retail,
            "healthcare" => Vertical::Healthcare,
            "construction" => Vertical::Construction,
            "hoa" => Vertical::Hoa,
            "events" => Vertical::Events,
            "education" => Vertical::Education,
            "hospitality" => Vertical::Hospitality,
            "manufacturing" => Vertical::Manufacturing,
            "government" => Vertical::Government,
            "financial" => Vertical::Financial,
            _ => Vertical::Other,
        }
    }
}

impl fmt::Display for Vertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facility section of the notes blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityDetails {
    pub sqft: Option<Value>,
    pub employees: Option<Value>,
    pub visitors: Option<Value>,
    pub hours: Option<Value>,
    pub current_security: Option<String>,
}

/// Assessment context stored alongside the contact as a JSON text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadNotes {
    pub assessment_date: DateTime<Utc>,
    pub overall_score: Option<f64>,
    pub top_concerns: Vec<String>,
    pub facility_details: FacilityDetails,
    /// Snapshot at submission time; `null` when the provider had nothing.
    pub crime_data: Option<CrimeStats>,
}

/// Lead ready to be written to the contact store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub title: String,
    pub vertical: Vertical,
    pub state: String,
    pub city: String,
    pub source: String,
    pub lead_score: i32,
    pub notes: LeadNotes,
}

/// Row of the CRM `"Contact"` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    #[sqlx(rename = "firstName")]
    pub first_name: String,
    #[sqlx(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub title: String,
    pub vertical: String,
    pub state: String,
    pub city: String,
    pub source: String,
    #[sqlx(rename = "leadScore")]
    pub lead_score: i32,
    /// Serialized `LeadNotes`.
    pub notes: String,
    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Contact {
    /// "First Last", or just the first name when no last name was given.
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

// ============ Outbound ============

/// Body returned for an accepted submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub success: bool,
    pub lead_id: String,
    pub crime_data: Option<CrimeStats>,
    pub message: String,
    pub is_test: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_defaults_for_missing_fields() {
        let submission: Submission = serde_json::from_str(r#"{"businessName":"Acme"}"#).unwrap();
        assert_eq!(submission.business_name, "Acme");
        assert_eq!(submission.contact_name, "");
        assert!(submission.overall_score.is_none());
        assert!(submission.concerns.is_empty());
        assert!(!submission.is_test);
    }

    #[test]
    fn test_submission_nulls_take_defaults() {
        let submission: Submission = serde_json::from_str(
            r#"{"businessName":"Acme","contactName":null,"phone":null,"state":null,
                "businessType":null,"overallScore":null,"concerns":null,"isTest":null,
                "incidents":null,"sqft":null}"#,
        )
        .unwrap();
        assert_eq!(submission.business_name, "Acme");
        assert_eq!(submission.contact_name, "");
        assert_eq!(submission.phone, "");
        assert_eq!(submission.business_type, "");
        assert!(submission.overall_score.is_none());
        assert!(submission.concerns.is_empty());
        assert!(!submission.is_test);
        assert!(submission.incidents.is_none());
        assert!(submission.sqft.is_none());
    }

    #[test]
    fn test_submission_numeric_string_score() {
        let submission: Submission =
            serde_json::from_str(r#"{"overallScore":" 60 "}"#).unwrap();
        assert_eq!(submission.overall_score, Some(60.0));

        let submission: Submission =
            serde_json::from_str(r#"{"overallScore":"high"}"#).unwrap();
        assert!(submission.overall_score.is_none());

        let submission: Submission = serde_json::from_str(r#"{"overallScore":72.5}"#).unwrap();
        assert_eq!(submission.overall_score, Some(72.5));
    }

    #[test]
    fn test_submission_rejects_wrong_shapes() {
        assert!(serde_json::from_str::<Submission>(r#"{"concerns":"theft"}"#).is_err());
        assert!(serde_json::from_str::<Submission>(r#"[1,2,3]"#).is_err());
    }

    #[test]
    fn test_vertical_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(Vertical::CommercialRe).unwrap(),
            serde_json::json!("commercial_re")
        );
        for (_, vertical) in Vertical::BUSINESS_TYPES {
            assert_eq!(Vertical::from_stored(vertical.as_str()), vertical);
        }
    }

    #[test]
    fn test_display_name_without_last_name() {
        let contact = Contact {
            id: "1".to_string(),
            first_name: "Cher".to_string(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            company: String::new(),
            title: String::new(),
            vertical: "other".to_string(),
            state: String::new(),
            city: String::new(),
            source: LEAD_SOURCE.to_string(),
            lead_score: 50,
            notes: "{}".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(contact.display_name(), "Cher");
    }
}
