use crate::database::models::employee::SortField;
use crate::security::sanitizer::{
    normalize_text, validate_pagination_params, validate_sort_field, InvalidInput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    /// `desc` in any case selects descending order; anything else is ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(normalize_text) {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

/// A validated page/sort request. Can only be built through [`PageRequest::new`],
/// which runs the pagination and sort-field checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i32,
    size: i32,
    sort: SortField,
    direction: SortDirection,
}

impl PageRequest {
    pub fn new(
        page: i32,
        size: i32,
        sort_by: Option<&str>,
        direction: SortDirection,
    ) -> Result<Self, InvalidInput> {
        validate_pagination_params(page, size)?;
        validate_sort_field(sort_by)?;

        let sort = sort_by
            .and_then(SortField::from_attribute)
            .unwrap_or_default();

        Ok(Self { page, size, sort, direction })
    }

    pub fn page(&self) -> i32 {
        self.page
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn sort(&self) -> SortField {
        self.sort
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// `ORDER BY` clause built from the fixed column set, never from raw input.
    /// `id` is appended as a tie-breaker so page boundaries are stable.
    pub fn order_by_sql(&self) -> String {
        let mut clause = format!("ORDER BY \"{}\" {}", self.sort.column(), self.direction.to_sql());
        if self.sort != SortField::Id {
            clause.push_str(", \"id\" ASC");
        }
        clause
    }
}

/// One page of results plus the total across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: i32,
    pub size: i32,
    pub total_elements: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        Self {
            content,
            number: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    pub fn total_pages(&self) -> i64 {
        total_pages(self.total_elements, i64::from(self.size))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// Ceiling division; an empty page size yields zero pages.
pub fn total_pages(total_elements: i64, size: i64) -> i64 {
    if size <= 0 {
        return 0;
    }
    (total_elements + size - 1) / size
}
