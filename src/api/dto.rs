use serde::{Deserialize, Serialize};

use crate::database::paging::Page;

const NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=100;
const ROLE_LENGTH: std::ops::RangeInclusive<usize> = 2..=50;

/// Employee as exchanged over HTTP. Every field is optional on input so
/// PATCH can carry a subset; create and replace call [`EmployeeDto::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDto {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub role: Option<String>,
}

impl EmployeeDto {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            role: Some(role.into()),
        }
    }

    /// Request-level checks applied before sanitization.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_text(&mut errors, "name", self.name.as_deref(), "Employee name", NAME_LENGTH);
        check_text(&mut errors, "role", self.role.as_deref(), "Employee role", ROLE_LENGTH);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_text(
    errors: &mut Vec<FieldError>,
    field: &str,
    value: Option<&str>,
    label: &str,
    length: std::ops::RangeInclusive<usize>,
) {
    match value {
        Some(v) if !v.trim().is_empty() => {
            if !length.contains(&v.chars().count()) {
                errors.push(FieldError::new(
                    field,
                    Some(v),
                    format!(
                        "{} must be between {} and {} characters",
                        label,
                        length.start(),
                        length.end()
                    ),
                ));
            }
        }
        other => errors.push(FieldError::new(field, other, format!("{} is required", label))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub rejected_value: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, rejected_value: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rejected_value: rejected_value.map(str::to_string),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedEmployees {
    pub employee_list: Vec<EmployeeDto>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub size: i64,
    pub number: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

/// Collection body: `{"embedded":{"employeeList":[...]},"page":{...}}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeListResponse {
    pub embedded: EmbeddedEmployees,
    pub page: PageMetadata,
}

impl EmployeeListResponse {
    pub fn from_page(page: Page<EmployeeDto>) -> Self {
        let metadata = PageMetadata {
            size: i64::from(page.size),
            number: i64::from(page.number),
            total_elements: page.total_elements,
            total_pages: page.total_pages(),
        };
        Self {
            embedded: EmbeddedEmployees { employee_list: page.content },
            page: metadata,
        }
    }

    /// Single page holding every item.
    pub fn unpaged(items: Vec<EmployeeDto>) -> Self {
        let total = items.len() as i64;
        Self {
            embedded: EmbeddedEmployees { employee_list: items },
            page: PageMetadata {
                size: total,
                number: 0,
                total_elements: total,
                total_pages: if total == 0 { 0 } else { 1 },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: String,
    /// Request path, filled in by the `error_path` middleware
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldError>>,
    pub trace_id: String,
}
