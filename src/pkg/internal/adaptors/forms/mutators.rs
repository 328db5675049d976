use sqlx::{types::Json, PgConnection};

use crate::{
    pkg::internal::{
        adaptors::forms::spec::FormEntry,
        forms::{FormTemplate, Recipient},
    },
    prelude::Result,
};

pub struct FormMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> FormMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        FormMutator { pool }
    }

    /// Returns None when another template already owns the title; titles
    /// name a form's purpose and are unique, so concurrent creators race
    /// toward one surviving row.
    pub async fn create(&mut self, template: &FormTemplate) -> Result<Option<FormEntry>> {
        let row = sqlx::query_as::<_, FormEntry>(
            r#"
            INSERT INTO form_templates (token, title, fields, recipients)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (title) DO NOTHING
            RETURNING token, title, fields, recipients, created_at, updated_at
            "#,
        )
        .bind(&template.token)
        .bind(&template.title)
        .bind(Json(&template.fields))
        .bind(Json(&template.recipients))
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Writes one recipient's submission record in place. Only the array
    /// element matching the email is replaced, in a single statement, so
    /// concurrent submissions by different recipients on the same template
    /// never clobber each other. Returns None when the token is unknown or
    /// the email is not on the recipient list.
    pub async fn record_submission(
        &mut self,
        token: &str,
        recipient: &Recipient,
    ) -> Result<Option<FormEntry>> {
        let row = sqlx::query_as::<_, FormEntry>(
            r#"
            UPDATE form_templates
            SET recipients = (
                SELECT COALESCE(jsonb_agg(
                    CASE WHEN elem->>'email' = $2 THEN $3::jsonb ELSE elem END
                ), '[]'::jsonb)
                FROM jsonb_array_elements(recipients) AS elem
            ),
            updated_at = CURRENT_TIMESTAMP
            WHERE token = $1 AND recipients @> $4
            RETURNING token, title, fields, recipients, created_at, updated_at
            "#,
        )
        .bind(token)
        .bind(&recipient.email)
        .bind(Json(recipient))
        .bind(serde_json::json!([{ "email": &recipient.email }]))
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }

    /// Upserts a recipient by email, again touching only their element: an
    /// existing recipient keeps inline completion state and has name/role
    /// merged over, a new one is appended.
    pub async fn upsert_recipient(
        &mut self,
        token: &str,
        recipient: &Recipient,
    ) -> Result<Option<FormEntry>> {
        let row = sqlx::query_as::<_, FormEntry>(
            r#"
            UPDATE form_templates
            SET recipients = CASE
                WHEN recipients @> $4 THEN (
                    SELECT COALESCE(jsonb_agg(
                        CASE WHEN elem->>'email' = $2
                             THEN elem || jsonb_build_object('name', $5::text, 'role', $6::text)
                             ELSE elem END
                    ), '[]'::jsonb)
                    FROM jsonb_array_elements(recipients) AS elem
                )
                ELSE recipients || $3::jsonb
            END,
            updated_at = CURRENT_TIMESTAMP
            WHERE token = $1
            RETURNING token, title, fields, recipients, created_at, updated_at
            "#,
        )
        .bind(token)
        .bind(&recipient.email)
        .bind(Json(recipient))
        .bind(serde_json::json!([{ "email": &recipient.email }]))
        .bind(&recipient.name)
        .bind(&recipient.role)
        .fetch_optional(&mut *self.pool)
        .await?;
        Ok(row)
    }
}
