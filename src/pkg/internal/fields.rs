use serde::{Deserialize, Serialize};

/// Closed set of field types a form template may carry. The wire names are
/// lowercase; the aliases cover the spellings used by older client payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    #[serde(alias = "multiline")]
    Textarea,
    Email,
    Number,
    Currency,
    Decimal,
    Date,
    #[serde(alias = "date-time")]
    Datetime,
    #[serde(alias = "tel")]
    Phone,
    #[serde(alias = "decision")]
    Checkbox,
    File,
    Image,
    Multiselect,
    Dropdown,
    Radio,
    Country,
    Gender,
    #[serde(rename = "blood-group", alias = "bloodgroup")]
    BloodGroup,
    Url,
    Notes,
    Formula,
    Lookup,
}

impl FieldKind {
    /// Choice-style kinds carry an `options` list on the template field.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldKind::Multiselect
                | FieldKind::Dropdown
                | FieldKind::Radio
                | FieldKind::Country
                | FieldKind::Gender
                | FieldKind::BloodGroup
        )
    }
}

/// A submitted field value. Untagged on the wire: a JSON bool, number,
/// string, string array or file-reference object, in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Numeric(f64),
    Text(String),
    Selection(Vec<String>),
    Attachment(FileRef),
}

/// Reference to an uploaded file. The upload transport itself lives outside
/// the engine; only the handle is recorded against the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
}

/// Does `value` count as an answer for a field of kind `kind`?
///
/// This is the one predicate shared by the submission path and the progress
/// path; both must agree on it. Note the quirks carried over from observed
/// behavior: an explicit checkbox `false` is not an answer, and numeric zero
/// (numeric or string form) is not an answer.
pub fn is_answered(kind: FieldKind, value: Option<&FieldValue>) -> bool {
    let Some(value) = value else {
        return false;
    };
    match kind {
        FieldKind::Checkbox => matches!(value, FieldValue::Flag(true)),
        FieldKind::File | FieldKind::Image => match value {
            FieldValue::Attachment(_) => true,
            FieldValue::Text(reference) => !reference.is_empty(),
            _ => false,
        },
        FieldKind::Multiselect => {
            matches!(value, FieldValue::Selection(picked) if !picked.is_empty())
        }
        FieldKind::Number | FieldKind::Currency | FieldKind::Decimal => match value {
            FieldValue::Numeric(n) => *n != 0.0,
            FieldValue::Text(raw) => {
                !raw.is_empty() && raw.parse::<f64>().map(|n| n != 0.0).unwrap_or(true)
            }
            _ => false,
        },
        _ => match value {
            FieldValue::Text(text) => !text.is_empty(),
            _ => true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: serde_json::Value) -> Option<FieldValue> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_checkbox_false_is_not_an_answer() {
        assert!(is_answered(FieldKind::Checkbox, Some(&FieldValue::Flag(true))));
        assert!(!is_answered(FieldKind::Checkbox, Some(&FieldValue::Flag(false))));
        assert!(!is_answered(FieldKind::Checkbox, None));
    }

    #[test]
    fn test_numeric_zero_is_not_an_answer() {
        assert!(!is_answered(FieldKind::Number, Some(&FieldValue::Numeric(0.0))));
        assert!(!is_answered(FieldKind::Number, Some(&FieldValue::Text("0".into()))));
        assert!(!is_answered(FieldKind::Number, Some(&FieldValue::Text("".into()))));
        assert!(!is_answered(FieldKind::Currency, Some(&FieldValue::Text("0.0".into()))));
        assert!(is_answered(FieldKind::Number, Some(&FieldValue::Numeric(42.0))));
        assert!(is_answered(FieldKind::Decimal, Some(&FieldValue::Text("3.14".into()))));
    }

    #[test]
    fn test_multiselect_needs_a_non_empty_list() {
        assert!(!is_answered(FieldKind::Multiselect, Some(&FieldValue::Selection(vec![]))));
        assert!(!is_answered(FieldKind::Multiselect, Some(&FieldValue::Text("a".into()))));
        assert!(is_answered(
            FieldKind::Multiselect,
            Some(&FieldValue::Selection(vec!["a".into()]))
        ));
    }

    #[test]
    fn test_file_accepts_handle_or_stored_path() {
        let upload = FieldValue::Attachment(FileRef {
            name: "offer.pdf".into(),
            path: None,
            size: Some(1024),
        });
        assert!(is_answered(FieldKind::File, Some(&upload)));
        assert!(is_answered(FieldKind::Image, Some(&FieldValue::Text("/uploads/pic.png".into()))));
        assert!(!is_answered(FieldKind::File, Some(&FieldValue::Text("".into()))));
        assert!(!is_answered(FieldKind::File, Some(&FieldValue::Flag(true))));
    }

    #[test]
    fn test_plain_kinds_reject_only_empty() {
        assert!(is_answered(FieldKind::Text, Some(&FieldValue::Text("hi".into()))));
        assert!(!is_answered(FieldKind::Text, Some(&FieldValue::Text("".into()))));
        assert!(!is_answered(FieldKind::Email, None));
        assert!(is_answered(FieldKind::Dropdown, Some(&FieldValue::Text("yes".into()))));
    }

    #[test]
    fn test_value_wire_shapes() {
        assert_eq!(parse(json!(true)), Some(FieldValue::Flag(true)));
        assert_eq!(parse(json!(7)), Some(FieldValue::Numeric(7.0)));
        assert_eq!(parse(json!("hello")), Some(FieldValue::Text("hello".into())));
        assert_eq!(
            parse(json!(["a", "b"])),
            Some(FieldValue::Selection(vec!["a".into(), "b".into()]))
        );
        assert_eq!(
            parse(json!({"name": "cv.pdf", "path": "/tmp/cv.pdf"})),
            Some(FieldValue::Attachment(FileRef {
                name: "cv.pdf".into(),
                path: Some("/tmp/cv.pdf".into()),
                size: None,
            }))
        );
        let absent: Option<FieldValue> = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(absent, None);
    }

    #[test]
    fn test_kind_aliases() {
        let tel: FieldKind = serde_json::from_value(json!("tel")).unwrap();
        assert_eq!(tel, FieldKind::Phone);
        let decision: FieldKind = serde_json::from_value(json!("decision")).unwrap();
        assert_eq!(decision, FieldKind::Checkbox);
        let bg: FieldKind = serde_json::from_value(json!("blood-group")).unwrap();
        assert_eq!(bg, FieldKind::BloodGroup);
        let dt: FieldKind = serde_json::from_value(json!("date-time")).unwrap();
        assert_eq!(dt, FieldKind::Datetime);
        assert_eq!(serde_json::to_value(FieldKind::BloodGroup).unwrap(), json!("blood-group"));
    }
}
