use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::security::sanitizer::{
    role_equals, validate_and_sanitize_name, validate_and_sanitize_role, InvalidInput,
};

/// Employee entity. `name` and `role` can only be written through the
/// sanitizing setters, so a stored value is always normalized.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Employee {
    id: Option<i64>,
    name: String,
    role: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: Option<i64>,
}

impl Employee {
    /// New, not yet persisted employee.
    pub fn new(name: Option<&str>, role: Option<&str>) -> Result<Self, InvalidInput> {
        Ok(Self {
            id: None,
            name: validate_and_sanitize_name(name)?,
            role: validate_and_sanitize_role(role)?,
            created_at: None,
            updated_at: None,
            version: None,
        })
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn version(&self) -> Option<i64> {
        self.version
    }

    pub fn set_name(&mut self, name: Option<&str>) -> Result<(), InvalidInput> {
        self.name = validate_and_sanitize_name(name)?;
        Ok(())
    }

    pub fn set_role(&mut self, role: Option<&str>) -> Result<(), InvalidInput> {
        self.role = validate_and_sanitize_role(role)?;
        Ok(())
    }

    /// Replaces both fields, or neither if either value is rejected.
    pub fn update_details(&mut self, name: Option<&str>, role: Option<&str>) -> Result<(), InvalidInput> {
        let name = validate_and_sanitize_name(name)?;
        let role = validate_and_sanitize_role(role)?;
        self.name = name;
        self.role = role;
        Ok(())
    }

    pub fn has_role(&self, role: &str) -> bool {
        role_equals(Some(self.role.as_str()), Some(role))
    }

    /// Stamps identity and audit fields on first save.
    pub(crate) fn mark_created(&mut self, id: i64, now: DateTime<Utc>) {
        self.id = Some(id);
        self.created_at = Some(now);
        self.updated_at = Some(now);
        self.version = Some(0);
    }

    /// Bumps the optimistic-lock version and the modification time.
    pub(crate) fn mark_updated(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
        self.version = Some(self.version.unwrap_or(0) + 1);
    }
}

/// Attributes results can be ordered by. This is the only place the
/// sortable set is defined; request validation and query building both
/// read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    #[default]
    Id,
    Name,
    Role,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Id,
        SortField::Name,
        SortField::Role,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    /// Attribute name as exposed in the API (`sortBy=createdAt`).
    pub fn attribute(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Role => "role",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    /// Column name in the `employees` table.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Role => "role",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_attribute(attribute: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.attribute() == attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sanitizes_both_fields() {
        let employee = Employee::new(Some("  Jose\u{0301} Garcia "), Some("Dev\u{0007}Ops")).unwrap();
        assert_eq!(employee.name(), "Jos\u{00E9} Garcia");
        assert_eq!(employee.role(), "DevOps");
        assert_eq!(employee.id(), None);
        assert_eq!(employee.version(), None);
    }

    #[test]
    fn new_rejects_invalid_role() {
        let err = Employee::new(Some("Jane Doe"), Some("Engineer!")).unwrap_err();
        assert_eq!(err.field, Some("role"));
    }

    #[test]
    fn failed_setter_leaves_value_unchanged() {
        let mut employee = Employee::new(Some("Jane Doe"), Some("Engineer")).unwrap();
        assert!(employee.set_name(Some("J4ne")).is_err());
        assert_eq!(employee.name(), "Jane Doe");
        assert!(employee.set_role(None).is_err());
        assert_eq!(employee.role(), "Engineer");
    }

    #[test]
    fn update_details_is_all_or_nothing() {
        let mut employee = Employee::new(Some("Jane Doe"), Some("Engineer")).unwrap();
        assert!(employee.update_details(Some("Janet Doe"), Some("<b>boss</b>")).is_err());
        assert_eq!(employee.name(), "Jane Doe");
        assert_eq!(employee.role(), "Engineer");

        employee.update_details(Some("Janet Doe"), Some("Manager")).unwrap();
        assert_eq!(employee.name(), "Janet Doe");
        assert_eq!(employee.role(), "Manager");
    }

    #[test]
    fn has_role_ignores_case() {
        let employee = Employee::new(Some("Jane Doe"), Some("Software Engineer")).unwrap();
        assert!(employee.has_role("software engineer"));
        assert!(!employee.has_role("Engineer"));
    }

    #[test]
    fn audit_marks() {
        let mut employee = Employee::new(Some("Jane Doe"), Some("Engineer")).unwrap();
        let now = Utc::now();
        employee.mark_created(7, now);
        assert_eq!(employee.id(), Some(7));
        assert_eq!(employee.version(), Some(0));
        employee.mark_updated(now);
        assert_eq!(employee.version(), Some(1));
    }

    #[test]
    fn sort_field_lookup_is_exact() {
        assert_eq!(SortField::from_attribute("createdAt"), Some(SortField::CreatedAt));
        assert_eq!(SortField::from_attribute("created_at"), None);
        assert_eq!(SortField::from_attribute("ID"), None);
        assert_eq!(SortField::CreatedAt.column(), "created_at");
    }
}
