use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use standard_error::{Interpolate, StandardError, Status};

use crate::{
    conf::settings,
    pkg::{
        internal::{
            adaptors::forms::{mutators::FormMutator, selectors::FormSelector},
            email::{assign::FormInvite, SendEmail},
            fields::{FieldKind, FieldValue},
        },
        server::{
            handlers::forms::{CreateFormInput, RecipientInput},
            state::AppState,
        },
    },
    prelude::Result,
};

/// One typed question slot on a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// A recipient's answer to one template field, as recorded on submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default)]
    pub value: Option<FieldValue>,
}

/// A party authorized to answer this template. Identity key is the email;
/// completion state lives inline (`completed_fields` null means the
/// recipient has never submitted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
    pub role: String,
    #[serde(default)]
    pub completed_fields: Option<Vec<CompletedField>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTemplate {
    pub token: String,
    pub title: String,
    pub fields: Vec<Field>,
    pub recipients: Vec<Recipient>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Opaque access token. Minted once per template, never rotated; the only
/// key recipients ever see.
pub fn mint_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn validation_err(detail: &str) -> StandardError {
    StandardError::new("ERR-FORM-001")
        .code(StatusCode::BAD_REQUEST)
        .interpolate_err(detail.to_string())
}

impl FormTemplate {
    /// Validates and assembles a fresh template with a newly minted token.
    /// Nothing is persisted here; a failed validation leaves no trace.
    pub fn build(title: &str, fields: Vec<Field>, recipients: Vec<RecipientInput>) -> Result<Self> {
        if title.trim().is_empty() {
            return Err(validation_err("title must not be empty"));
        }
        if fields.is_empty() {
            return Err(validation_err("a template needs at least one field"));
        }
        for field in &fields {
            if field.id.trim().is_empty() || field.label.trim().is_empty() {
                return Err(validation_err("every field needs an id and a label"));
            }
        }
        let mut seen = Vec::with_capacity(recipients.len());
        for r in &recipients {
            if r.email.trim().is_empty() || r.role.trim().is_empty() {
                return Err(validation_err("every recipient needs an email and a role"));
            }
            if seen.contains(&r.email) {
                return Err(validation_err("two recipients share an email"));
            }
            seen.push(r.email.clone());
        }
        let now = Utc::now();
        Ok(FormTemplate {
            token: mint_token(),
            title: title.to_string(),
            fields,
            recipients: recipients.into_iter().map(Recipient::from).collect(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn recipient(&self, email: &str) -> Option<&Recipient> {
        self.recipients.iter().find(|r| r.email == email)
    }

    /// Role, when given, must match exactly; an "employee" lookup does not
    /// see templates where the same email sits as a "candidate".
    pub fn has_recipient(&self, email: &str, role: Option<&str>) -> bool {
        self.recipients
            .iter()
            .any(|r| r.email == email && role.map(|want| r.role == want).unwrap_or(true))
    }

    /// Records a submission for `email`. Acceptance is unconditional once
    /// the recipient matches: partial answers are stored as-is and
    /// `completed_at` advances to now on every call (last write wins).
    pub fn record_submission(
        &mut self,
        email: &str,
        completed: Vec<CompletedField>,
    ) -> Result<&Recipient> {
        let now = Utc::now();
        self.updated_at = now;
        let recipient = self
            .recipients
            .iter_mut()
            .find(|r| r.email == email)
            .ok_or_else(|| StandardError::new("ERR-FORM-003").code(StatusCode::FORBIDDEN))?;
        recipient.completed_fields = Some(completed);
        recipient.completed_at = Some(now);
        Ok(&*recipient)
    }
}

impl From<RecipientInput> for Recipient {
    fn from(input: RecipientInput) -> Self {
        Recipient {
            name: input.name,
            email: input.email,
            role: input.role,
            completed_fields: None,
            completed_at: None,
        }
    }
}

fn not_found() -> StandardError {
    StandardError::new("ERR-FORM-002").code(StatusCode::NOT_FOUND)
}

/// Fire-and-forget distribution mail. Delivery failures are logged inside
/// the mail task and never surface into engine state.
fn notify(template: &FormTemplate, recipient: &Recipient) {
    let invite = FormInvite {
        recipient_name: recipient.name.clone(),
        form_title: template.title.clone(),
        link: format!("{}/forms/{}", &settings.base_url, &template.token),
    };
    if let Err(e) = invite.send(&recipient.email) {
        tracing::warn!("could not queue invite for {}: {:?}", &recipient.email, e);
    }
}

impl FormTemplate {
    pub async fn create(state: &AppState, input: CreateFormInput) -> Result<FormTemplate> {
        let template = FormTemplate::build(&input.title, input.fields, input.recipients)?;
        let mut conn = state.db_pool.acquire().await?;
        let entry = FormMutator::new(&mut conn)
            .create(&template)
            .await?
            .ok_or_else(|| validation_err("a template with this title already exists"))?;
        let template: FormTemplate = entry.into();
        tracing::info!("created template '{}' ({})", &template.title, &template.token);
        for recipient in &template.recipients {
            notify(&template, recipient);
        }
        Ok(template)
    }

    pub async fn resolve(state: &AppState, token: &str) -> Result<FormTemplate> {
        let mut conn = state.db_pool.acquire().await?;
        let entry = FormSelector::new(&mut conn)
            .get_by_token(token)
            .await?
            .ok_or_else(not_found)?;
        Ok(entry.into())
    }

    /// Explicit form of the "create on first distribution" path: the named
    /// template is created with `default_fields` the first time it is
    /// needed and reused afterwards. Titles are unique, so when two callers
    /// race here the loser's insert is a no-op and both land on the same
    /// surviving row.
    pub async fn get_or_create(
        state: &AppState,
        title: &str,
        default_fields: Vec<Field>,
    ) -> Result<FormTemplate> {
        let mut conn = state.db_pool.acquire().await?;
        if let Some(entry) = FormSelector::new(&mut conn).get_by_title(title).await? {
            return Ok(entry.into());
        }
        let template = FormTemplate::build(title, default_fields, vec![])?;
        match FormMutator::new(&mut conn).create(&template).await? {
            Some(entry) => {
                tracing::info!("created template '{}' ({})", &template.title, &template.token);
                Ok(entry.into())
            }
            // lost the race: someone else just created it, use theirs
            None => Ok(FormSelector::new(&mut conn)
                .get_by_title(title)
                .await?
                .ok_or_else(not_found)?
                .into()),
        }
    }

    /// Upserts the recipient on the template behind `token` and sends them
    /// the access link. The write touches only that recipient's element.
    pub async fn assign(state: &AppState, token: &str, input: &RecipientInput) -> Result<FormTemplate> {
        if input.email.trim().is_empty() || input.role.trim().is_empty() {
            return Err(validation_err("every recipient needs an email and a role"));
        }
        let mut conn = state.db_pool.acquire().await?;
        let entry = FormMutator::new(&mut conn)
            .upsert_recipient(token, &Recipient::from(input.clone()))
            .await?
            .ok_or_else(not_found)?;
        let template: FormTemplate = entry.into();
        tracing::info!("assigned {} on '{}'", &input.email, &template.title);
        if let Some(recipient) = template.recipient(&input.email) {
            notify(&template, recipient);
        }
        Ok(template)
    }

    pub async fn for_recipient(
        state: &AppState,
        email: &str,
        role: Option<&str>,
    ) -> Result<Vec<FormTemplate>> {
        let mut conn = state.db_pool.acquire().await?;
        let entries = FormSelector::new(&mut conn).get_by_recipient(email).await?;
        Ok(entries
            .into_iter()
            .map(FormTemplate::from)
            .filter(|t| t.has_recipient(email, role))
            .collect())
    }

    pub async fn all(state: &AppState) -> Result<Vec<FormTemplate>> {
        let mut conn = state.db_pool.acquire().await?;
        let entries = FormSelector::new(&mut conn).get_all().await?;
        Ok(entries.into_iter().map(FormTemplate::from).collect())
    }

    /// The submission path. The token resolves the template; the email must
    /// additionally match a listed recipient before anything is written.
    /// The persisted write replaces only that recipient's element, so
    /// submissions by different recipients on one template never conflict.
    pub async fn submit(
        state: &AppState,
        token: &str,
        email: &str,
        completed: Vec<CompletedField>,
    ) -> Result<Recipient> {
        let mut template = FormTemplate::resolve(state, token).await?;
        let recipient = template.record_submission(email, completed)?.clone();
        let mut conn = state.db_pool.acquire().await?;
        FormMutator::new(&mut conn)
            .record_submission(&template.token, &recipient)
            .await?
            .ok_or_else(not_found)?;
        tracing::info!("{} submitted '{}'", &email, &template.title);
        Ok(recipient)
    }
}
