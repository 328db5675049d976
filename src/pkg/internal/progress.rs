use serde::{Deserialize, Serialize};

use crate::{
    pkg::{
        internal::{
            fields::is_answered,
            forms::{CompletedField, Field, FormTemplate},
        },
        server::state::AppState,
    },
    prelude::Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

/// Employee-level status. Same ladder as `FormStatus` but the completed
/// rung reads "Complete" on the wire, which is what dashboard consumers
/// match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Complete")]
    Complete,
}

/// Completion of one recipient on one form. Derived on demand, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct FormProgress {
    pub status: FormStatus,
    pub percentage: u32,
    pub completed_count: usize,
    pub total_count: usize,
}

/// Rollup across every form that lists the employee as a recipient. A form
/// counts toward `completed` only when fully answered; no partial credit.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeProgress {
    pub email: String,
    pub total_forms: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub percentage: u32,
    pub status: EmployeeStatus,
}

/// Counts template fields whose submitted value passes the answered
/// predicate. Fields never submitted count as unanswered.
pub fn answered_count(fields: &[Field], completed: &[CompletedField]) -> usize {
    fields
        .iter()
        .filter(|field| {
            let value = completed
                .iter()
                .find(|c| c.id == field.id)
                .and_then(|c| c.value.as_ref());
            is_answered(field.kind, value)
        })
        .count()
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

/// Classifies one recipient on one form. The canonical completion rule is
/// "every template field answered"; `completed_at` is a submission
/// timestamp, not a completion signal (a partial submit sets it too).
pub fn form_progress(template: &FormTemplate, email: &str) -> FormProgress {
    let total = template.fields.len();
    let completed_fields = template
        .recipient(email)
        .and_then(|r| r.completed_fields.as_deref());
    let Some(completed_fields) = completed_fields else {
        return FormProgress {
            status: FormStatus::NotStarted,
            percentage: 0,
            completed_count: 0,
            total_count: total,
        };
    };
    let answered = answered_count(&template.fields, completed_fields);
    let status = if total > 0 && answered == total {
        FormStatus::Completed
    } else {
        FormStatus::InProgress
    };
    FormProgress {
        status,
        percentage: percent(answered, total),
        completed_count: answered,
        total_count: total,
    }
}

/// Employee-level rollup over the given templates. Only templates listing
/// `email` as a recipient participate; pass a pre-filtered set or the whole
/// directory, the filter here is authoritative.
pub fn employee_progress(email: &str, templates: &[FormTemplate]) -> EmployeeProgress {
    let mine: Vec<&FormTemplate> = templates
        .iter()
        .filter(|t| t.has_recipient(email, None))
        .collect();
    let mut completed = 0;
    let mut in_progress = 0;
    let mut not_started = 0;
    for template in &mine {
        match form_progress(template, email).status {
            FormStatus::Completed => completed += 1,
            FormStatus::InProgress => in_progress += 1,
            FormStatus::NotStarted => not_started += 1,
        }
    }
    let total_forms = mine.len();
    let percentage = percent(completed, total_forms);
    // the employee-level status keys off the percentage alone: forms that
    // are merely in progress contribute nothing until fully completed
    let status = if total_forms > 0 && percentage == 100 {
        EmployeeStatus::Complete
    } else if percentage > 0 {
        EmployeeStatus::InProgress
    } else {
        EmployeeStatus::NotStarted
    };
    EmployeeProgress {
        email: email.to_string(),
        total_forms,
        completed,
        in_progress,
        not_started,
        percentage,
        status,
    }
}

/// Bulk variant: one rollup per distinct recipient email across the whole
/// template directory.
pub async fn for_all_employees(state: &AppState) -> Result<Vec<EmployeeProgress>> {
    let templates = FormTemplate::all(state).await?;
    let mut emails: Vec<String> = templates
        .iter()
        .flat_map(|t| t.recipients.iter().map(|r| r.email.clone()))
        .collect();
    emails.sort();
    emails.dedup();
    Ok(emails
        .iter()
        .map(|email| employee_progress(email, &templates))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::{
        internal::fields::{FieldKind, FieldValue},
        server::handlers::forms::RecipientInput,
    };

    fn field(id: &str, kind: FieldKind) -> Field {
        Field {
            id: id.into(),
            kind,
            label: id.to_uppercase(),
            required: false,
            options: vec![],
        }
    }

    fn recipient(email: &str) -> RecipientInput {
        RecipientInput {
            name: "someone".into(),
            email: email.into(),
            role: "employee".into(),
        }
    }

    fn template(title: &str, fields: Vec<Field>, emails: &[&str]) -> FormTemplate {
        FormTemplate::build(title, fields, emails.iter().map(|e| recipient(e)).collect())
            .unwrap()
    }

    fn answer(id: &str, value: FieldValue) -> CompletedField {
        CompletedField {
            id: id.into(),
            label: id.to_uppercase(),
            kind: FieldKind::Text,
            value: Some(value),
        }
    }

    #[test]
    fn test_not_started_without_recipient_or_submission() {
        let t = template("Tax", vec![field("a", FieldKind::Text)], &["x@y.com"]);
        assert_eq!(form_progress(&t, "x@y.com").status, FormStatus::NotStarted);
        assert_eq!(form_progress(&t, "stranger@y.com").status, FormStatus::NotStarted);
    }

    #[test]
    fn test_single_field_submission_completes_under_both_rules() {
        let mut t = template("Tax", vec![field("a", FieldKind::Text)], &["x@y.com"]);
        t.record_submission("x@y.com", vec![answer("a", FieldValue::Text("hi".into()))])
            .unwrap();
        let p = form_progress(&t, "x@y.com");
        assert_eq!(p.status, FormStatus::Completed);
        assert_eq!(p.percentage, 100);
        // the timestamp rule agrees here
        assert!(t.recipients[0].completed_at.is_some());
    }

    #[test]
    fn test_partial_submission_shows_the_rule_divergence() {
        let mut t = template(
            "Tax",
            vec![field("a", FieldKind::Text), field("b", FieldKind::Text)],
            &["x@y.com"],
        );
        t.record_submission("x@y.com", vec![answer("a", FieldValue::Text("hi".into()))])
            .unwrap();
        let p = form_progress(&t, "x@y.com");
        // completed_at is set, yet the canonical all-answered rule says 50%
        assert!(t.recipients[0].completed_at.is_some());
        assert_eq!(p.status, FormStatus::InProgress);
        assert_eq!(p.percentage, 50);
        assert_eq!(p.completed_count, 1);
        assert_eq!(p.total_count, 2);
    }

    #[test]
    fn test_unanswered_values_do_not_count() {
        let mut t = template(
            "Payroll",
            vec![
                field("salary", FieldKind::Number),
                field("agree", FieldKind::Checkbox),
                field("docs", FieldKind::Multiselect),
            ],
            &["x@y.com"],
        );
        t.record_submission(
            "x@y.com",
            vec![
                answer("salary", FieldValue::Numeric(0.0)),
                answer("agree", FieldValue::Flag(false)),
                answer("docs", FieldValue::Selection(vec![])),
            ],
        )
        .unwrap();
        let p = form_progress(&t, "x@y.com");
        assert_eq!(p.completed_count, 0);
        assert_eq!(p.status, FormStatus::InProgress);
    }

    #[test]
    fn test_employee_rollup() {
        let f = || vec![field("a", FieldKind::Text), field("b", FieldKind::Text)];
        let email = "emp@corp.com";

        let mut done = template("One", f(), &[email]);
        done.record_submission(
            email,
            vec![
                answer("a", FieldValue::Text("x".into())),
                answer("b", FieldValue::Text("y".into())),
            ],
        )
        .unwrap();
        let mut half_a = template("Two", f(), &[email]);
        half_a
            .record_submission(email, vec![answer("a", FieldValue::Text("x".into()))])
            .unwrap();
        let mut half_b = template("Three", f(), &[email]);
        half_b
            .record_submission(email, vec![answer("b", FieldValue::Text("y".into()))])
            .unwrap();
        let untouched = template("Four", f(), &[email]);
        // not the employee's form, must not count
        let other = template("Five", f(), &["someone@else.com"]);

        let all = vec![done, half_a, half_b, untouched, other];
        let p = employee_progress(email, &all);
        assert_eq!(p.total_forms, 4);
        assert_eq!(p.completed, 1);
        assert_eq!(p.in_progress, 2);
        assert_eq!(p.not_started, 1);
        assert_eq!(p.percentage, 25);
        assert_eq!(p.status, EmployeeStatus::InProgress);
    }

    #[test]
    fn test_fully_complete_employee() {
        let email = "emp@corp.com";
        let mut t = template("Only", vec![field("a", FieldKind::Text)], &[email]);
        t.record_submission(email, vec![answer("a", FieldValue::Text("x".into()))])
            .unwrap();
        let p = employee_progress(email, &[t]);
        assert_eq!(p.percentage, 100);
        assert_eq!(p.status, EmployeeStatus::Complete);
    }

    #[test]
    fn test_employee_without_forms() {
        let p = employee_progress("ghost@corp.com", &[]);
        assert_eq!(p.total_forms, 0);
        assert_eq!(p.percentage, 0);
        assert_eq!(p.status, EmployeeStatus::NotStarted);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_value(FormStatus::InProgress).unwrap(),
            serde_json::json!("In Progress")
        );
        assert_eq!(
            serde_json::to_value(FormStatus::NotStarted).unwrap(),
            serde_json::json!("Not Started")
        );
        assert_eq!(
            serde_json::to_value(FormStatus::Completed).unwrap(),
            serde_json::json!("Completed")
        );
        // the employee-level completed literal differs from the per-form one
        assert_eq!(
            serde_json::to_value(EmployeeStatus::Complete).unwrap(),
            serde_json::json!("Complete")
        );
    }
}
