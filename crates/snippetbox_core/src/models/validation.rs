//! Explicit payload validation.
//!
//! Each validator inspects a raw request and returns a [`ValidationReport`]
//! listing every failing field, rather than stopping at the first problem.

use super::language::ProgrammingLanguage;
use super::snippet::{CreateSnippetRequest, UpdateSnippetRequest};
use super::tag::{CreateTagRequest, UpdateTagRequest};
use crate::constants::{
    MAX_DESCRIPTION_CHARS, MAX_TAG_COLOR_CHARS, MAX_TAG_NAME_CHARS, MAX_TITLE_CHARS,
};
use crate::error::AppError;
use crate::text::char_len;
use serde::Serialize;

/// One failing field and its message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Outcome of validating a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// `true` when no field failed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the failing fields, in check order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.errors.iter().map(|error| error.field).collect()
    }

    /// Convert into a `Result`, joining all messages with `", "`.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] when any field failed.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.is_valid() {
            return Ok(());
        }
        let message = self
            .errors
            .into_iter()
            .map(|error| error.message)
            .collect::<Vec<_>>()
            .join(", ");
        Err(AppError::Validation(message))
    }
}

fn check_title(report: &mut ValidationReport, title: &str) {
    let title = title.trim();
    if title.is_empty() {
        report.push("title", "Title is required");
    } else if char_len(title) > MAX_TITLE_CHARS {
        report.push(
            "title",
            format!("Title must be at most {} characters", MAX_TITLE_CHARS),
        );
    }
}

fn check_description(report: &mut ValidationReport, description: &str) {
    let description = description.trim();
    if description.is_empty() {
        report.push("description", "Description is required");
    } else if char_len(description) > MAX_DESCRIPTION_CHARS {
        report.push(
            "description",
            format!(
                "Description must be at most {} characters",
                MAX_DESCRIPTION_CHARS
            ),
        );
    }
}

fn check_code(report: &mut ValidationReport, code: &str) {
    if code.trim().is_empty() {
        report.push("code", "Code is required");
    }
}

fn check_language(report: &mut ValidationReport, language: &str) {
    if language.trim().is_empty() {
        report.push("programming_language", "Programming language is required");
    } else if language.parse::<ProgrammingLanguage>().is_err() {
        report.push(
            "programming_language",
            format!("Unsupported programming language '{}'", language.trim()),
        );
    }
}

fn check_tag_name(report: &mut ValidationReport, name: &str) {
    let name = name.trim();
    if name.is_empty() {
        report.push("name", "Tag name is required");
    } else if char_len(name) > MAX_TAG_NAME_CHARS {
        report.push(
            "name",
            format!("Tag name must be at most {} characters", MAX_TAG_NAME_CHARS),
        );
    }
}

fn check_tag_color(report: &mut ValidationReport, color: &str) {
    let color = color.trim();
    if color.is_empty() {
        report.push("color", "Tag color is required");
    } else if char_len(color) > MAX_TAG_COLOR_CHARS || !is_hex_color(color) {
        report.push("color", "Color must be a valid hex color code");
    }
}

/// Accepts `#rgb` or `#rrggbb`.
pub fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// Validate a snippet create payload.
pub fn validate_create_snippet(req: &CreateSnippetRequest) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_title(&mut report, &req.title);
    check_description(&mut report, &req.description);
    check_code(&mut report, &req.code);
    check_language(&mut report, &req.programming_language);
    report
}

/// Validate a snippet update payload. Absent fields are not checked.
pub fn validate_update_snippet(req: &UpdateSnippetRequest) -> ValidationReport {
    let mut report = ValidationReport::default();
    if let Some(title) = &req.title {
        check_title(&mut report, title);
    }
    if let Some(description) = &req.description {
        check_description(&mut report, description);
    }
    if let Some(code) = &req.code {
        check_code(&mut report, code);
    }
    if let Some(language) = &req.programming_language {
        check_language(&mut report, language);
    }
    report
}

/// Validate a tag create payload.
pub fn validate_create_tag(req: &CreateTagRequest) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_tag_name(&mut report, &req.name);
    check_tag_color(&mut report, &req.color);
    report
}

/// Validate a tag update payload. Absent fields are not checked.
pub fn validate_update_tag(req: &UpdateTagRequest) -> ValidationReport {
    let mut report = ValidationReport::default();
    if let Some(name) = &req.name {
        check_tag_name(&mut report, name);
    }
    if let Some(color) = &req.color {
        check_tag_color(&mut report, color);
    }
    report
}
