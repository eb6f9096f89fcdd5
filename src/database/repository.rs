use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::employee::Employee;
use crate::database::paging::{Page, PageRequest};

/// Storage contract for employees. Implemented for PostgreSQL and for the
/// in-process development store.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Employee>, DatabaseError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, DatabaseError>;

    async fn exists_by_id(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Persists a new employee and returns it with id, timestamps and version set.
    async fn insert(&self, employee: Employee) -> Result<Employee, DatabaseError>;

    /// Saves name and role of a persisted employee. Fails with
    /// [`DatabaseError::OptimisticLock`] when the stored version has moved on.
    async fn update(&self, employee: Employee) -> Result<Employee, DatabaseError>;

    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError>;

    async fn find_by_name_containing_ignore_case(
        &self,
        fragment: &str,
    ) -> Result<Vec<Employee>, DatabaseError>;

    async fn find_by_name_and_role(
        &self,
        fragment: &str,
        role: &str,
    ) -> Result<Vec<Employee>, DatabaseError>;

    async fn find_by_role_ignore_case(&self, role: &str) -> Result<Vec<Employee>, DatabaseError>;

    async fn count(&self) -> Result<i64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

const COLUMNS: &str = "id, name, role, created_at, updated_at, version";

/// Escapes LIKE wildcards so user text only ever matches literally.
pub fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn contains_pattern(fragment: &str) -> String {
    format!("%{}%", escape_like(fragment))
}

pub struct PgEmployeeRepository {
    pool: PgPool,
}

impl PgEmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for PgEmployeeRepository {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Employee>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM employees {} LIMIT $1 OFFSET $2",
            COLUMNS,
            request.order_by_sql()
        );
        let content = sqlx::query_as::<_, Employee>(&query)
            .bind(request.limit())
            .bind(request.offset())
            .fetch_all(&self.pool)
            .await?;
        let total = self.count().await?;
        Ok(Page::new(content, request, total))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, DatabaseError> {
        let query = format!("SELECT {} FROM employees WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, Employee>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM employees WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert(&self, employee: Employee) -> Result<Employee, DatabaseError> {
        let query = format!(
            "INSERT INTO employees (name, role) VALUES ($1, $2) RETURNING {}",
            COLUMNS
        );
        let saved = sqlx::query_as::<_, Employee>(&query)
            .bind(employee.name())
            .bind(employee.role())
            .fetch_one(&self.pool)
            .await?;
        Ok(saved)
    }

    async fn update(&self, employee: Employee) -> Result<Employee, DatabaseError> {
        let id = employee
            .id()
            .ok_or_else(|| DatabaseError::QueryError("cannot update an unsaved employee".to_string()))?;

        let query = format!(
            "UPDATE employees SET name = $1, role = $2, updated_at = now(), version = version + 1 \
             WHERE id = $3 AND version = $4 RETURNING {}",
            COLUMNS
        );
        let saved = sqlx::query_as::<_, Employee>(&query)
            .bind(employee.name())
            .bind(employee.role())
            .bind(id)
            .bind(employee.version().unwrap_or(0))
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = saved {
            return Ok(row);
        }
        if self.exists_by_id(id).await? {
            Err(DatabaseError::OptimisticLock { id })
        } else {
            Err(DatabaseError::NotFound(format!("employee {}", id)))
        }
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_name_containing_ignore_case(
        &self,
        fragment: &str,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let query = format!(
            r"SELECT {} FROM employees WHERE name ILIKE $1 ESCAPE '\' ORDER BY id",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, Employee>(&query)
            .bind(contains_pattern(fragment))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_name_and_role(
        &self,
        fragment: &str,
        role: &str,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let query = format!(
            r"SELECT {} FROM employees WHERE name ILIKE $1 ESCAPE '\' AND LOWER(role) = LOWER($2) ORDER BY id",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, Employee>(&query)
            .bind(contains_pattern(fragment))
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_role_ignore_case(&self, role: &str) -> Result<Vec<Employee>, DatabaseError> {
        let query = format!(
            "SELECT {} FROM employees WHERE LOWER(role) = LOWER($1) ORDER BY id",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, Employee>(&query)
            .bind(role)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(contains_pattern("o'b"), "%o'b%");
    }
}
