pub mod collection;
pub mod find;
pub mod record;

use axum::extract::{rejection::PathRejection, Path};

use crate::error::ApiError;

// Re-export handler functions for use in routing
pub use collection::get as collection_get;
pub use collection::post as collection_post;

pub use record::delete as record_delete;
pub use record::get as record_get;
pub use record::patch as record_patch;
pub use record::put as record_put;

pub use find::by_role as find_by_role;
pub use find::count as find_count;
pub use find::search as find_search;

pub const BASE_PATH: &str = "/api/v1/employees";

/// Location of a single employee resource
pub fn employee_location(id: Option<i64>) -> String {
    match id {
        Some(id) => format!("{}/{}", BASE_PATH, id),
        None => BASE_PATH.to_string(),
    }
}

/// Resolves the `{id}` path segment. Ids start at 1.
pub fn employee_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = path?;
    if id < 1 {
        return Err(ApiError::constraint_violation("Employee ID must be positive"));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_ids() {
        assert_eq!(employee_id(Ok(Path(7))).unwrap(), 7);
        let err = employee_id(Ok(Path(0))).unwrap_err();
        assert_eq!(err.error_code(), "CONSTRAINT_VIOLATION");
        assert!(employee_id(Ok(Path(-3))).is_err());
    }

    #[test]
    fn builds_locations() {
        assert_eq!(employee_location(Some(12)), "/api/v1/employees/12");
        assert_eq!(employee_location(None), "/api/v1/employees");
    }
}
