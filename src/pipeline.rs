//! Lead enrichment pipeline.
//!
//! Runs one submission through lookup, mapping and scoring, persistence and notification,
//! strictly in sequence. Each fallible stage declares how its failures are handled:
//!
//! - `Absorb`: the failure is logged and the stage yields no value.
//! - `Propagate`: the failure aborts the pipeline and reaches the caller.
//!
//! Crime data and alerts are optional enrichment and absorb their failures; persistence
//! is the core effect and propagates. The alert needs the stored contact id, so a
//! persistence failure means no alert is sent.

use std::fmt;
use std::sync::Arc;

use crate::alerts::{format_lead_alert, AlertChannel};
use crate::contact_store::ContactStore;
use crate::crime_data::CrimeDataProvider;
use crate::errors::AppError;
use crate::models::{Contact, CrimeStats, Submission};
use crate::scoring::map_and_score;

/// How a stage reacts to its own failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Absorb,
    Propagate,
}

/// Fallible pipeline stages. Mapping and scoring is a pure function and has no stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lookup,
    Persist,
    Notify,
}

impl Stage {
    pub const fn failure_mode(self) -> FailureMode {
        match self {
            Stage::Lookup | Stage::Notify => FailureMode::Absorb,
            Stage::Persist => FailureMode::Propagate,
        }
    }

    /// Applies this stage's failure mode to a stage result.
    ///
    /// Absorbed failures come back as `Ok(None)`.
    pub fn settle<T>(self, result: Result<T, AppError>) -> Result<Option<T>, AppError> {
        match (result, self.failure_mode()) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(e), FailureMode::Absorb) => {
                tracing::warn!("⚠️  {} stage failed, continuing without it: {}", self, e);
                Ok(None)
            }
            (Err(e), FailureMode::Propagate) => {
                tracing::error!("❌ {} stage failed: {}", self, e);
                Err(e)
            }
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lookup => "lookup",
            Stage::Persist => "persist",
            Stage::Notify => "notify",
        };
        f.write_str(name)
    }
}

/// Result of a submission that made it through persistence.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub contact: Contact,
    pub crime_data: Option<CrimeStats>,
    /// Whether the alert reached the channel.
    pub alert_sent: bool,
}

/// Looks up crime data, treating every provider failure as "no data".
pub async fn lookup_crime_data(
    provider: &dyn CrimeDataProvider,
    city: &str,
    state: &str,
) -> Option<CrimeStats> {
    match Stage::Lookup.settle(provider.lookup(city, state).await) {
        Ok(stats) => stats.flatten(),
        // Lookup never propagates
        Err(_) => None,
    }
}

/// Wires the three external collaborators together.
#[derive(Clone)]
pub struct LeadPipeline {
    crime_data: Arc<dyn CrimeDataProvider>,
    contacts: Arc<dyn ContactStore>,
    alerts: Arc<dyn AlertChannel>,
    crm_base_url: String,
}

impl LeadPipeline {
    pub fn new(
        crime_data: Arc<dyn CrimeDataProvider>,
        contacts: Arc<dyn ContactStore>,
        alerts: Arc<dyn AlertChannel>,
        crm_base_url: String,
    ) -> Self {
        Self {
            crime_data,
            contacts,
            alerts,
            crm_base_url,
        }
    }

    /// Processes one submission end to end.
    ///
    /// # Returns
    ///
    /// * `Ok(PipelineOutcome)` once the contact is stored, whatever happened to the alert.
    /// * `Err(AppError::StoreFault)` if the contact could not be stored.
    pub async fn process(&self, submission: &Submission) -> Result<PipelineOutcome, AppError> {
        tracing::info!(
            "📨 Processing assessment for '{}' ({}, {}) test={}",
            submission.business_name,
            submission.city,
            submission.state,
            submission.is_test
        );

        // 1. Lookup
        let crime_data =
            lookup_crime_data(self.crime_data.as_ref(), &submission.city, &submission.state)
                .await;

        // 2. Map and score
        let lead = map_and_score(submission, crime_data.as_ref());
        tracing::debug!(
            "Lead mapped: vertical={}, score={}",
            lead.vertical,
            lead.lead_score
        );

        // 3. Persist
        let contact = Stage::Persist
            .settle(self.contacts.create_contact(&lead).await)?
            .ok_or_else(|| AppError::InternalError("Contact store returned nothing".to_string()))?;

        // 4. Notify
        let message = format_lead_alert(
            &contact,
            &submission.concerns,
            crime_data.as_ref(),
            &self.crm_base_url,
            submission.is_test,
        );
        let alert_sent = Stage::Notify
            .settle(self.alerts.notify(&message).await)?
            .is_some();

        tracing::info!(
            "✅ Assessment lead {} stored (alert_sent={})",
            contact.id,
            alert_sent
        );

        Ok(PipelineOutcome {
            contact,
            crime_data,
            alert_sent,
        })
    }
}
