use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::DEFAULT_VERTICAL_COLUMN_TYPE;
use crate::errors::AppError;
use crate::models::{Contact, LeadRecord};

/// Durable store for CRM contacts.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Writes a new contact and returns it with its store-assigned identifier.
    async fn create_contact(&self, lead: &LeadRecord) -> Result<Contact, AppError>;
}

/// Contact store backed by the CRM's Postgres `"Contact"` table.
#[derive(Clone)]
pub struct PgContactStore {
    pool: PgPool,
    insert_sql: String,
}

impl PgContactStore {
    /// Store for a CRM whose `vertical` column uses the default enum type.
    pub fn new(pool: PgPool) -> Self {
        Self::with_vertical_type(pool, DEFAULT_VERTICAL_COLUMN_TYPE)
    }

    /// Store whose `vertical` parameter is cast to `vertical_type` on insert.
    ///
    /// The name must already be validated as a plain identifier; `Config` does this for
    /// `CRM_VERTICAL_TYPE`.
    pub fn with_vertical_type(pool: PgPool, vertical_type: &str) -> Self {
        Self {
            pool,
            insert_sql: insert_contact_sql(vertical_type),
        }
    }
}

/// Insert statement for one contact.
///
/// The vertical is bound as text and cast to the column type, so the same statement
/// works for an enum column and a plain text column (`text`).
pub fn insert_contact_sql(vertical_type: &str) -> String {
    format!(
        r#"
            INSERT INTO "Contact" (
                id,
                "firstName",
                "lastName",
                email,
                phone,
                company,
                title,
                vertical,
                state,
                city,
                source,
                "leadScore",
                notes,
                "createdAt",
                "updatedAt"
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8::text::"{vertical_type}", $9, $10, $11, $12, $13, NOW(), NOW())
            RETURNING
                id, "firstName", "lastName", email, phone, company, title,
                vertical::text AS vertical, state, city, source, "leadScore", notes,
                "createdAt"::timestamptz AS "createdAt"
            "#
    )
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn create_contact(&self, lead: &LeadRecord) -> Result<Contact, AppError> {
        let notes = serde_json::to_string(&lead.notes).map_err(|e| {
            AppError::StoreFault(format!("Failed to serialize lead notes: {}", e))
        })?;
        let id = Uuid::new_v4().to_string();

        let contact = sqlx::query_as::<_, Contact>(&self.insert_sql)
            .bind(&id)
            .bind(&lead.first_name)
            .bind(&lead.last_name)
            .bind(&lead.email)
            .bind(&lead.phone)
            .bind(&lead.company)
            .bind(&lead.title)
            .bind(lead.vertical.as_str())
            .bind(&lead.state)
            .bind(&lead.city)
            .bind(&lead.source)
            .bind(lead.lead_score)
            .bind(&notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("CRM save error for '{}': {:?}", lead.company, e);
                AppError::from(e)
            })?;

        tracing::info!(
            "✓ Contact {} stored (vertical={}, score={})",
            contact.id,
            contact.vertical,
            contact.lead_score
        );
        Ok(contact)
    }
}
