//! Input validation for tag and student mutations.
//!
//! Builders check user input before anything reaches the API; a form that
//! fails validation never produces a request.

use std::sync::LazyLock;

use regex::Regex;

use super::graphql::{CreateStudentInput, CreateTagInput, UpdateStudentInput, UpdateTagInput};
use crate::error::{Result, RosterError};

pub const TAG_NAME_MAX_LEN: usize = 50;
pub const STUDENT_STATUSES: &[&str] = &["active", "inactive"];

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex color regex should be valid"));

fn invalid(message: impl Into<String>) -> RosterError {
    RosterError::Validation(message.into())
}

fn tag_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("tag name cannot be empty"));
    }
    if name.chars().count() > TAG_NAME_MAX_LEN {
        return Err(invalid(format!(
            "tag name must be at most {TAG_NAME_MAX_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

fn tag_color(color: &str) -> Result<String> {
    let color = color.trim();
    if !HEX_COLOR.is_match(color) {
        return Err(invalid(format!(
            "color '{color}' must be a hex value like #1E90FF"
        )));
    }
    Ok(color.to_ascii_uppercase())
}

fn person_name(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(invalid(format!("{field} cannot be empty")));
    }
    Ok(value.to_string())
}

fn email(value: &str) -> Result<String> {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(value.to_string()),
        _ => Err(invalid(format!("'{value}' is not an email address"))),
    }
}

fn status(value: &str) -> Result<String> {
    let value = value.trim().to_ascii_lowercase();
    if !STUDENT_STATUSES.contains(&value.as_str()) {
        return Err(invalid(format!(
            "status must be one of: {}",
            STUDENT_STATUSES.join(", ")
        )));
    }
    Ok(value)
}

#[derive(Debug, Clone, Default)]
pub struct TagForm {
    pub name: String,
    pub color: Option<String>,
}

impl TagForm {
    pub fn validate(&self) -> Result<CreateTagInput> {
        Ok(CreateTagInput {
            name: tag_name(&self.name)?,
            color: self.color.as_deref().map(tag_color).transpose()?,
        })
    }
}

/// Partial tag update. At least one field must be set.
#[derive(Debug, Clone, Default)]
pub struct TagPatch {
    pub name: Option<String>,
    pub color: Option<String>,
}

impl TagPatch {
    pub fn validate(&self) -> Result<UpdateTagInput> {
        if self.name.is_none() && self.color.is_none() {
            return Err(invalid("nothing to update"));
        }
        Ok(UpdateTagInput {
            name: self.name.as_deref().map(tag_name).transpose()?,
            color: self.color.as_deref().map(tag_color).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentForm {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub status: Option<String>,
}

impl StudentForm {
    pub fn validate(&self) -> Result<CreateStudentInput> {
        Ok(CreateStudentInput {
            first_name: person_name("first name", &self.first_name)?,
            last_name: person_name("last name", &self.last_name)?,
            email: self.email.as_deref().map(email).transpose()?,
            status: self.status.as_deref().map(status).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub status: Option<String>,
}

impl StudentPatch {
    pub fn validate(&self) -> Result<UpdateStudentInput> {
        if self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.status.is_none()
        {
            return Err(invalid("nothing to update"));
        }
        Ok(UpdateStudentInput {
            first_name: self
                .first_name
                .as_deref()
                .map(|v| person_name("first name", v))
                .transpose()?,
            last_name: self
                .last_name
                .as_deref()
                .map(|v| person_name("last name", v))
                .transpose()?,
            email: self.email.as_deref().map(email).transpose()?,
            status: self.status.as_deref().map(status).transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_form_trims_and_normalizes() {
        let input = TagForm {
            name: "  VIP ".to_string(),
            color: Some("#1e90ff".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(input.name, "VIP");
        assert_eq!(input.color.as_deref(), Some("#1E90FF"));
    }

    #[test]
    fn test_tag_name_limits() {
        let empty = TagForm {
            name: "   ".to_string(),
            color: None,
        };
        assert!(matches!(empty.validate(), Err(RosterError::Validation(_))));

        let at_limit = TagForm {
            name: "a".repeat(TAG_NAME_MAX_LEN),
            color: None,
        };
        assert!(at_limit.validate().is_ok());

        let too_long = TagForm {
            name: "a".repeat(TAG_NAME_MAX_LEN + 1),
            color: None,
        };
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_tag_color_must_be_hex() {
        for bad in ["red", "#12345", "#1234567", "123456", "#GGGGGG"] {
            let form = TagForm {
                name: "x".to_string(),
                color: Some(bad.to_string()),
            };
            assert!(form.validate().is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_empty_patch_is_rejected() {
        assert!(TagPatch::default().validate().is_err());
        assert!(StudentPatch::default().validate().is_err());

        let patch = TagPatch {
            color: Some("#000000".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(patch.name, None);
    }

    #[test]
    fn test_student_form() {
        let input = StudentForm {
            first_name: " Ana ".to_string(),
            last_name: "Lima".to_string(),
            email: Some("ana@example.com".to_string()),
            status: Some("Active".to_string()),
        }
        .validate()
        .unwrap();
        assert_eq!(input.first_name, "Ana");
        assert_eq!(input.status.as_deref(), Some("active"));

        let missing_last = StudentForm {
            first_name: "Ana".to_string(),
            ..Default::default()
        };
        assert!(missing_last.validate().is_err());

        let bad_email = StudentForm {
            first_name: "Ana".to_string(),
            last_name: "Lima".to_string(),
            email: Some("ana.example.com".to_string()),
            status: None,
        };
        assert!(bad_email.validate().is_err());

        let bad_status = StudentForm {
            first_name: "Ana".to_string(),
            last_name: "Lima".to_string(),
            email: None,
            status: Some("graduated".to_string()),
        };
        assert!(bad_status.validate().is_err());
    }
}
