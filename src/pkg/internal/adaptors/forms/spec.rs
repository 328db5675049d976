use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow};

use crate::pkg::internal::forms::{Field, FormTemplate, Recipient};

/// Row shape of `form_templates`. Fields and recipients are embedded as
/// JSONB so one submission is one single-row update.
#[derive(Debug, Clone, FromRow)]
pub struct FormEntry {
    pub token: String,
    pub title: String,
    pub fields: Json<Vec<Field>>,
    pub recipients: Json<Vec<Recipient>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FormEntry> for FormTemplate {
    fn from(entry: FormEntry) -> Self {
        FormTemplate {
            token: entry.token,
            title: entry.title,
            fields: entry.fields.0,
            recipients: entry.recipients.0,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
        }
    }
}
