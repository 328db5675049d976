use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use standard_error::{StandardError, Status};

use crate::{
    pkg::{
        internal::{
            forms::FormTemplate,
            progress::{self, EmployeeProgress},
        },
        server::state::AppState,
    },
    prelude::Result,
};

/// Singular lookup errors when the email is on no template at all; the bulk
/// variant below just renders an empty list instead.
pub async fn for_employee(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<EmployeeProgress>> {
    let templates = FormTemplate::for_recipient(&state, &email, None).await?;
    if templates.is_empty() {
        return Err(StandardError::new("ERR-FORM-002").code(StatusCode::NOT_FOUND));
    }
    Ok(Json(progress::employee_progress(&email, &templates)))
}

pub async fn all_employees(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmployeeProgress>>> {
    Ok(Json(progress::for_all_employees(&state).await?))
}
