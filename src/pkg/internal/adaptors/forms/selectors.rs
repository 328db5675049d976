use sqlx::PgConnection;

use crate::{pkg::internal::adaptors::forms::spec::FormEntry, prelude::Result};

pub struct FormSelector<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> FormSelector<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        FormSelector { pool }
    }

    pub async fn get_by_token(&mut self, token: &str) -> Result<Option<FormEntry>> {
        let row = sqlx::query_as::<_, FormEntry>(
            "SELECT token, title, fields, recipients, created_at, updated_at
             FROM form_templates WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn get_by_title(&mut self, title: &str) -> Result<Option<FormEntry>> {
        let row = sqlx::query_as::<_, FormEntry>(
            "SELECT token, title, fields, recipients, created_at, updated_at
             FROM form_templates WHERE title = $1
             ORDER BY created_at LIMIT 1",
        )
        .bind(title)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// JSONB containment on the embedded recipient list; role narrowing is
    /// applied by the caller on the loaded rows.
    pub async fn get_by_recipient(&mut self, email: &str) -> Result<Vec<FormEntry>> {
        let rows = sqlx::query_as::<_, FormEntry>(
            "SELECT token, title, fields, recipients, created_at, updated_at
             FROM form_templates WHERE recipients @> $1
             ORDER BY created_at DESC",
        )
        .bind(serde_json::json!([{ "email": email }]))
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_all(&mut self) -> Result<Vec<FormEntry>> {
        let rows = sqlx::query_as::<_, FormEntry>(
            "SELECT token, title, fields, recipients, created_at, updated_at
             FROM form_templates ORDER BY created_at DESC",
        )
        .fetch_all(&mut *self.pool)
        .await?;
        Ok(rows)
    }
}
