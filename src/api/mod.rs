pub mod dto;
pub mod format;

pub use dto::{EmployeeDto, EmployeeListResponse, ErrorResponse, FieldError, PageMetadata};
