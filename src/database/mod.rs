pub mod manager;
pub mod memory;
pub mod models;
pub mod paging;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::InMemoryEmployeeRepository;
pub use models::{Employee, SortField};
pub use paging::{Page, PageRequest, SortDirection};
pub use repository::{EmployeeStore, PgEmployeeRepository};
