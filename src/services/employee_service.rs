use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::dto::EmployeeDto;
use crate::api::format::{to_dto, to_dto_list, to_entity, update_entity_from_dto};
use crate::database::manager::DatabaseError;
use crate::database::paging::{Page, PageRequest};
use crate::database::repository::EmployeeStore;
use crate::security::sanitizer::{normalize_text, InvalidInput};
use crate::services::cache::{CacheStats, EmployeeCache};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInput),

    #[error("Employee not found: {0}")]
    NotFound(i64),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Result of a replace: the target existed, or a new record was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated(EmployeeDto),
    Created(EmployeeDto),
}

#[async_trait]
pub trait EmployeeService: Send + Sync {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<EmployeeDto>, ServiceError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<EmployeeDto>, ServiceError>;

    async fn create(&self, dto: &EmployeeDto) -> Result<EmployeeDto, ServiceError>;

    /// Replaces name and role. A missing id creates a new record under a
    /// generated id.
    async fn update(&self, id: i64, dto: &EmployeeDto) -> Result<UpdateOutcome, ServiceError>;

    /// Applies the fields present in `dto`. `None` if the employee does not exist.
    async fn partial_update(&self, id: i64, dto: &EmployeeDto) -> Result<Option<EmployeeDto>, ServiceError>;

    async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError>;

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError>;

    async fn search(&self, name: &str, role: Option<&str>) -> Result<Vec<EmployeeDto>, ServiceError>;

    async fn find_by_role(&self, role: &str) -> Result<Vec<EmployeeDto>, ServiceError>;

    async fn count(&self) -> Result<i64, ServiceError>;

    async fn cache_stats(&self) -> CacheStats;

    async fn clear_caches(&self);

    async fn ping(&self) -> Result<(), ServiceError>;
}

pub struct EmployeeServiceImpl {
    store: Arc<dyn EmployeeStore>,
    cache: EmployeeCache,
}

impl EmployeeServiceImpl {
    pub fn new(store: Arc<dyn EmployeeStore>, cache: EmployeeCache) -> Self {
        Self { store, cache }
    }
}

#[async_trait]
impl EmployeeService for EmployeeServiceImpl {
    async fn find_page(&self, request: &PageRequest) -> Result<Page<EmployeeDto>, ServiceError> {
        debug!(
            "Fetching employees with pagination: page={}, size={}",
            request.page(),
            request.size()
        );
        let page = self.store.find_page(request).await?;
        info!(
            "Retrieved {} employees from page {} of {}",
            page.content.len(),
            page.number,
            page.total_pages()
        );
        Ok(page.map(|e| to_dto(&e)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<EmployeeDto>, ServiceError> {
        debug!("Fetching employee with id: {}", id);
        if let Some(cached) = self.cache.get(id).await {
            return Ok(Some(cached));
        }

        let ticket = self.cache.ticket();
        match self.store.find_by_id(id).await? {
            Some(employee) => {
                info!("Employee found with id: {}", id);
                let dto = to_dto(&employee);
                self.cache.put(ticket, &dto).await;
                Ok(Some(dto))
            }
            None => {
                warn!("Employee not found with id: {}", id);
                Ok(None)
            }
        }
    }

    async fn create(&self, dto: &EmployeeDto) -> Result<EmployeeDto, ServiceError> {
        debug!("Creating new employee: {:?}", dto);
        let saved = self.store.insert(to_entity(dto)?).await?;
        self.cache.evict_count().await;

        let dto = to_dto(&saved);
        info!("Employee created successfully with id: {:?}", dto.id);
        Ok(dto)
    }

    async fn update(&self, id: i64, dto: &EmployeeDto) -> Result<UpdateOutcome, ServiceError> {
        debug!("Updating employee with id: {}, data: {:?}", id, dto);

        let ticket = self.cache.ticket();
        let Some(mut existing) = self.store.find_by_id(id).await? else {
            info!("Employee not found with id: {}, creating new employee", id);
            let created = self.create(dto).await?;
            return Ok(UpdateOutcome::Created(created));
        };

        existing.update_details(dto.name.as_deref(), dto.role.as_deref())?;
        let saved = self.store.update(existing).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => ServiceError::NotFound(id),
            other => ServiceError::Database(other),
        })?;

        let dto = to_dto(&saved);
        self.cache.put(ticket, &dto).await;
        info!("Employee updated successfully with id: {}", id);
        Ok(UpdateOutcome::Updated(dto))
    }

    async fn partial_update(&self, id: i64, dto: &EmployeeDto) -> Result<Option<EmployeeDto>, ServiceError> {
        debug!("Partially updating employee with id: {}, data: {:?}", id, dto);

        let ticket = self.cache.ticket();
        let Some(mut existing) = self.store.find_by_id(id).await? else {
            warn!("Employee not found for partial update with id: {}", id);
            return Ok(None);
        };

        update_entity_from_dto(&mut existing, dto)?;
        let saved = match self.store.update(existing).await {
            Ok(saved) => saved,
            Err(DatabaseError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let dto = to_dto(&saved);
        self.cache.put(ticket, &dto).await;
        info!("Employee partially updated successfully with id: {}", id);
        Ok(Some(dto))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        debug!("Deleting employee with id: {}", id);
        let deleted = self.store.delete_by_id(id).await?;
        self.cache.evict(id).await;

        if deleted {
            self.cache.evict_count().await;
            info!("Employee deleted successfully with id: {}", id);
        } else {
            warn!("Employee not found for deletion with id: {}", id);
        }
        Ok(deleted)
    }

    async fn exists_by_id(&self, id: i64) -> Result<bool, ServiceError> {
        let exists = self.store.exists_by_id(id).await?;
        debug!("Employee exists with id {}: {}", id, exists);
        Ok(exists)
    }

    async fn search(&self, name: &str, role: Option<&str>) -> Result<Vec<EmployeeDto>, ServiceError> {
        let name = normalize_text(name).trim().to_string();
        let role = role
            .map(|r| normalize_text(r).trim().to_string())
            .filter(|r| !r.is_empty());
        debug!("Searching employees by name containing: {:?}, role: {:?}", name, role);

        let employees: Vec<_> = match role.as_deref() {
            Some(role) => self
                .store
                .find_by_name_and_role(&name, role)
                .await?
                .into_iter()
                .filter(|e| e.has_role(role))
                .collect(),
            None => self.store.find_by_name_containing_ignore_case(&name).await?,
        };

        info!("Found {} employees matching name: {:?}", employees.len(), name);
        Ok(to_dto_list(&employees))
    }

    async fn find_by_role(&self, role: &str) -> Result<Vec<EmployeeDto>, ServiceError> {
        let role = normalize_text(role).trim().to_string();
        debug!("Searching employees by role: {:?}", role);

        let employees: Vec<_> = self
            .store
            .find_by_role_ignore_case(&role)
            .await?
            .into_iter()
            .filter(|e| e.has_role(&role))
            .collect();

        info!("Found {} employees with role: {:?}", employees.len(), role);
        Ok(to_dto_list(&employees))
    }

    async fn count(&self) -> Result<i64, ServiceError> {
        if let Some(count) = self.cache.get_count().await {
            return Ok(count);
        }
        let ticket = self.cache.ticket();
        let count = self.store.count().await?;
        self.cache.put_count(ticket, count).await;
        info!("Total employee count: {}", count);
        Ok(count)
    }

    async fn cache_stats(&self) -> CacheStats {
        self.cache.stats().await
    }

    async fn clear_caches(&self) {
        self.cache.clear().await;
        info!("Employee caches cleared");
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        self.store.ping().await?;
        Ok(())
    }
}
