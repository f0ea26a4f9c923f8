//! Partial song updates
//!
//! A PUT body is a JSON object holding any subset of the updatable fields.
//! It is validated as a whole before anything is written: one bad field
//! rejects the entire request.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

/// Date format accepted for `release_date` in update bodies
pub const RELEASE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Updatable song fields; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongPatch {
    pub name: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub text: Option<String>,
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("Request body must be a JSON object")]
    NotAnObject,

    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{field}' must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Field 'name' cannot be empty")]
    EmptyName,

    #[error("Invalid date format. Use YYYY-MM-DD")]
    InvalidDate,
}

impl SongPatch {
    /// Parse and validate an update body
    pub fn from_json(body: &Value) -> Result<Self, PatchError> {
        let fields = body.as_object().ok_or(PatchError::NotAnObject)?;
        let mut patch = SongPatch::default();

        for (key, value) in fields {
            match key.as_str() {
                "name" => {
                    let name = as_string(value, "name")?;
                    if name.trim().is_empty() {
                        return Err(PatchError::EmptyName);
                    }
                    patch.name = Some(name);
                }
                "release_date" => {
                    let raw = value.as_str().ok_or(PatchError::InvalidDate)?;
                    let date = NaiveDate::parse_from_str(raw, RELEASE_DATE_FORMAT)
                        .map_err(|_| PatchError::InvalidDate)?;
                    patch.release_date = Some(date);
                }
                "text" => patch.text = Some(as_string(value, "text")?),
                "group_id" => {
                    // null would orphan the song
                    let id = value
                        .as_i64()
                        .filter(|id| *id > 0)
                        .ok_or(PatchError::InvalidType {
                            field: "group_id",
                            expected: "a positive integer",
                        })?;
                    patch.group_id = Some(id);
                }
                other => return Err(PatchError::UnknownField(other.to_string())),
            }
        }

        Ok(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.release_date.is_none()
            && self.text.is_none()
            && self.group_id.is_none()
    }
}

fn as_string(value: &Value, field: &'static str) -> Result<String, PatchError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or(PatchError::InvalidType {
            field,
            expected: "a string",
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_patch() {
        let patch = SongPatch::from_json(&json!({
            "name": "Uprising",
            "release_date": "2009-09-07",
            "text": "a\nb",
            "group_id": 4
        }))
        .unwrap();

        assert_eq!(patch.name.as_deref(), Some("Uprising"));
        assert_eq!(patch.release_date, NaiveDate::from_ymd_opt(2009, 9, 7));
        assert_eq!(patch.text.as_deref(), Some("a\nb"));
        assert_eq!(patch.group_id, Some(4));
    }

    #[test]
    fn test_subset_leaves_other_fields_untouched() {
        let patch = SongPatch::from_json(&json!({ "text": "new words" })).unwrap();
        assert_eq!(
            patch,
            SongPatch {
                text: Some("new words".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_empty_object_is_empty_patch() {
        assert!(SongPatch::from_json(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_bad_date_rejects_whole_patch() {
        let err = SongPatch::from_json(&json!({
            "name": "Valid name",
            "release_date": "07.09.2009"
        }))
        .unwrap_err();
        assert_eq!(err, PatchError::InvalidDate);
        assert_eq!(err.to_string(), "Invalid date format. Use YYYY-MM-DD");
    }

    #[test]
    fn test_non_string_date_rejected() {
        assert_eq!(
            SongPatch::from_json(&json!({ "release_date": 20090907 })),
            Err(PatchError::InvalidDate)
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert_eq!(
            SongPatch::from_json(&json!({ "id": 99 })),
            Err(PatchError::UnknownField("id".to_string()))
        );
    }

    #[test]
    fn test_null_group_rejected() {
        assert!(matches!(
            SongPatch::from_json(&json!({ "group_id": null })),
            Err(PatchError::InvalidType { field: "group_id", .. })
        ));
        assert!(matches!(
            SongPatch::from_json(&json!({ "group_id": 0 })),
            Err(PatchError::InvalidType { field: "group_id", .. })
        ));
    }

    #[test]
    fn test_blank_name_rejected() {
        assert_eq!(
            SongPatch::from_json(&json!({ "name": "  " })),
            Err(PatchError::EmptyName)
        );
    }

    #[test]
    fn test_non_object_body_rejected() {
        assert_eq!(
            SongPatch::from_json(&json!(["name", "x"])),
            Err(PatchError::NotAnObject)
        );
    }
}
