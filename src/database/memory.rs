use async_trait::async_trait;
use chrono::Utc;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::models::employee::{Employee, SortField};
use crate::database::paging::{Page, PageRequest, SortDirection};
use crate::database::repository::EmployeeStore;
use crate::security::sanitizer::fold_case;

#[derive(Default)]
struct State {
    next_id: i64,
    rows: BTreeMap<i64, Employee>,
}

/// Process-local employee store. Same contract as the PostgreSQL repository,
/// contents are lost on restart.
#[derive(Default)]
pub struct InMemoryEmployeeRepository {
    state: RwLock<State>,
}

impl InMemoryEmployeeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare(a: &Employee, b: &Employee, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id().cmp(&b.id()),
        SortField::Name => a.name().cmp(b.name()),
        SortField::Role => a.role().cmp(b.role()),
        SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortField::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
    }
}

/// `needle` must already be case-folded.
fn name_contains(employee: &Employee, needle: &str) -> bool {
    fold_case(employee.name()).contains(needle)
}

#[async_trait]
impl EmployeeStore for InMemoryEmployeeRepository {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<Employee>, DatabaseError> {
        let state = self.state.read().await;
        let mut all: Vec<&Employee> = state.rows.values().collect();
        all.sort_by(|a, b| {
            let primary = compare(a, b, request.sort());
            let primary = match request.direction() {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary.then_with(|| a.id().cmp(&b.id()))
        });

        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(request.limit()).unwrap_or(0);
        let content = all.into_iter().skip(offset).take(limit).cloned().collect();
        Ok(Page::new(content, request, state.rows.len() as i64))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Employee>, DatabaseError> {
        Ok(self.state.read().await.rows.get(&id).cloned())
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.state.read().await.rows.contains_key(&id))
    }

    async fn insert(&self, mut employee: Employee) -> Result<Employee, DatabaseError> {
        let mut state = self.state.write().await;
        state.next_id += 1;
        let id = state.next_id;
        employee.mark_created(id, Utc::now());
        state.rows.insert(id, employee.clone());
        Ok(employee)
    }

    async fn update(&self, mut employee: Employee) -> Result<Employee, DatabaseError> {
        let id = employee
            .id()
            .ok_or_else(|| DatabaseError::QueryError("cannot update an unsaved employee".to_string()))?;

        let mut state = self.state.write().await;
        let stored = state
            .rows
            .get(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("employee {}", id)))?;
        if stored.version() != employee.version() {
            return Err(DatabaseError::OptimisticLock { id });
        }

        employee.mark_updated(Utc::now());
        state.rows.insert(id, employee.clone());
        Ok(employee)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.state.write().await.rows.remove(&id).is_some())
    }

    async fn find_by_name_containing_ignore_case(
        &self,
        fragment: &str,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let needle = fold_case(fragment);
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|e| name_contains(e, &needle))
            .cloned()
            .collect())
    }

    async fn find_by_name_and_role(
        &self,
        fragment: &str,
        role: &str,
    ) -> Result<Vec<Employee>, DatabaseError> {
        let needle = fold_case(fragment);
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|e| name_contains(e, &needle) && e.has_role(role))
            .cloned()
            .collect())
    }

    async fn find_by_role_ignore_case(&self, role: &str) -> Result<Vec<Employee>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state
            .rows
            .values()
            .filter(|e| e.has_role(role))
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        Ok(self.state.read().await.rows.len() as i64)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
