//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assessment_lead_api::alerts::TelegramAlertChannel;
use assessment_lead_api::contact_store::ContactStore;
use assessment_lead_api::crime_data::FbiCrimeClient;
use assessment_lead_api::errors::AppError;
use assessment_lead_api::models::{Contact, LeadRecord};
use assessment_lead_api::pipeline::LeadPipeline;
use async_trait::async_trait;
use chrono::Utc;

pub const API_KEY: &str = "test-fbi-key";
pub const BOT_TOKEN: &str = "test-bot-token";
pub const CHAT_ID: &str = "8000";
pub const CRM_BASE: &str = "https://crm.example.com";

/// In-memory contact store that records every lead it is given.
#[derive(Default)]
pub struct RecordingStore {
    pub leads: Mutex<Vec<LeadRecord>>,
}

impl RecordingStore {
    pub fn stored(&self) -> Vec<LeadRecord> {
        self.leads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContactStore for RecordingStore {
    async fn create_contact(&self, lead: &LeadRecord) -> Result<Contact, AppError> {
        let mut leads = self.leads.lock().unwrap();
        leads.push(lead.clone());
        Ok(Contact {
            id: format!("lead-{}", leads.len()),
            first_name: lead.first_name.clone(),
            last_name: lead.last_name.clone(),
            email: lead.email.clone(),
            phone: lead.phone.clone(),
            company: lead.company.clone(),
            title: lead.title.clone(),
            vertical: lead.vertical.as_str().to_string(),
            state: lead.state.clone(),
            city: lead.city.clone(),
            source: lead.source.clone(),
            lead_score: lead.lead_score,
            notes: serde_json::to_string(&lead.notes).unwrap(),
            created_at: Utc::now(),
        })
    }
}

/// Contact store whose writes always fail.
pub struct FailingStore;

#[async_trait]
impl ContactStore for FailingStore {
    async fn create_contact(&self, _lead: &LeadRecord) -> Result<Contact, AppError> {
        Err(AppError::StoreFault(
            "duplicate key value violates unique constraint".to_string(),
        ))
    }
}

pub fn crime_client(base_url: &str) -> FbiCrimeClient {
    FbiCrimeClient::new(
        base_url.to_string(),
        API_KEY.to_string(),
        Duration::from_secs(5),
    )
    .unwrap()
}

pub fn telegram_channel(base_url: &str) -> TelegramAlertChannel {
    TelegramAlertChannel::new(
        base_url.to_string(),
        BOT_TOKEN.to_string(),
        CHAT_ID.to_string(),
        Duration::from_secs(5),
    )
    .unwrap()
}

/// Pipeline whose crime provider and Telegram API both point at `mock_uri`.
pub fn pipeline(mock_uri: &str, store: Arc<dyn ContactStore>) -> LeadPipeline {
    LeadPipeline::new(
        Arc::new(crime_client(mock_uri)),
        store,
        Arc::new(telegram_channel(mock_uri)),
        CRM_BASE.to_string(),
    )
}

pub fn telegram_path() -> String {
    format!("/bot{}/sendMessage", BOT_TOKEN)
}
