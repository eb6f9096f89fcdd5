pub mod cache;
pub mod employee_service;

pub use cache::{CacheStats, CacheTicket, EmployeeCache};
pub use employee_service::{EmployeeService, EmployeeServiceImpl, ServiceError, UpdateOutcome};
