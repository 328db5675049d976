use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use standard_error::{Interpolate, StandardError, Status};
use validator::Validate;

use crate::{
    pkg::{
        internal::forms::{CompletedField, Field, FormTemplate, Recipient},
        server::state::AppState,
    },
    prelude::Result,
};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecipientInput {
    #[validate(length(min = 1, message = "Field cannot be empty"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, message = "Field cannot be empty"))]
    pub role: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFormInput {
    #[validate(length(min = 1, message = "Field cannot be empty"))]
    pub title: String,
    pub fields: Vec<Field>,
    #[serde(default)]
    pub recipients: Vec<RecipientInput>,
}

#[derive(Debug, Deserialize)]
pub struct AssignInput {
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    pub recipient: RecipientInput,
}

#[derive(Debug, Deserialize)]
pub struct SubmitInput {
    pub recipient_email: String,
    pub completed_fields: Vec<CompletedField>,
}

#[derive(Debug, Deserialize)]
pub struct RecipientQuery {
    pub email: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub recipient: Option<String>,
}

fn invalid(e: impl ToString) -> StandardError {
    StandardError::new("ERR-FORM-001")
        .code(StatusCode::BAD_REQUEST)
        .interpolate_err(e.to_string())
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateFormInput>,
) -> Result<Json<FormTemplate>> {
    input.validate().map_err(invalid)?;
    let template = FormTemplate::create(&state, input).await?;
    Ok(Json(template))
}

/// Recipient-facing resolve. `?recipient=` narrows the embedded recipient
/// list to that one record; without it the full (admin) view is returned.
/// Redaction beyond that is the caller's business.
pub async fn resolve(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<FormTemplate>> {
    let mut template = FormTemplate::resolve(&state, &token).await?;
    if let Some(email) = params.recipient {
        template.recipients.retain(|r| r.email == email);
    }
    Ok(Json(template))
}

/// Get-or-create by title, then upsert the recipient. This is the
/// distribution entry point used when onboarding an employee: the named
/// template comes into existence on first use.
pub async fn assign(
    State(state): State<AppState>,
    Json(input): Json<AssignInput>,
) -> Result<Json<FormTemplate>> {
    input.recipient.validate().map_err(invalid)?;
    let template = FormTemplate::get_or_create(&state, &input.title, input.fields).await?;
    let template = FormTemplate::assign(&state, &template.token, &input.recipient).await?;
    Ok(Json(template))
}

pub async fn add_recipient(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<RecipientInput>,
) -> Result<Json<FormTemplate>> {
    input.validate().map_err(invalid)?;
    let template = FormTemplate::assign(&state, &token, &input).await?;
    Ok(Json(template))
}

pub async fn submit(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(input): Json<SubmitInput>,
) -> Result<Json<Recipient>> {
    let recipient =
        FormTemplate::submit(&state, &token, &input.recipient_email, input.completed_fields)
            .await?;
    Ok(Json(recipient))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<RecipientQuery>,
) -> Result<Json<Vec<FormTemplate>>> {
    let templates =
        FormTemplate::for_recipient(&state, &params.email, params.role.as_deref()).await?;
    Ok(Json(templates))
}
