use crate::query::{Direction, Order};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sort specification, parsed from `"title,-id"` (a leading `-` means
/// descending).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn by(column: &str, direction: Direction) -> Self {
        Self::unsorted().and(column, direction)
    }

    pub fn and(mut self, column: &str, direction: Direction) -> Self {
        self.orders.push(Order {
            column: column.to_string(),
            direction,
        });
        self
    }

    pub fn is_unsorted(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut sort = Sort::unsorted();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (column, direction) = match part.strip_prefix('-') {
                Some(column) => (column, Direction::Desc),
                None => (part.strip_prefix('+').unwrap_or(part), Direction::Asc),
            };
            if column.is_empty() {
                return Err(format!("invalid sort expression: {s}"));
            }
            sort = sort.and(column, direction);
        }
        Ok(sort)
    }
}

impl TryFrom<String> for Sort {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .orders
            .iter()
            .map(|o| match o.direction {
                Direction::Asc => o.column.clone(),
                Direction::Desc => format!("-{}", o.column),
            })
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

impl From<Sort> for String {
    fn from(sort: Sort) -> Self {
        sort.to_string()
    }
}

/// Pagination parameters, extractable from query params.
///
/// Pages are 0-based here; `size = 0` means unpaged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pageable {
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_page_size")]
    pub size: u64,
    #[serde(default)]
    pub sort: Sort,
}

fn default_page_size() -> u64 {
    20
}

impl Default for Pageable {
    fn default() -> Self {
        Self {
            page: 0,
            size: default_page_size(),
            sort: Sort::unsorted(),
        }
    }
}

impl Pageable {
    pub fn of(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: Sort::unsorted(),
        }
    }

    pub fn unpaged() -> Self {
        Self::of(0, 0)
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn is_paged(&self) -> bool {
        self.size > 0
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }
}

/// A page of results with pagination metadata.
///
/// Page counts are derived, never stored:
/// - paged: `ceil(total_elements / size)`;
/// - unpaged: the content stands for the whole result, so one page when
///   anything exists;
/// - nothing at all: zero pages.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    content: Vec<T>,
    pageable: Pageable,
    total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        Self {
            content,
            pageable: pageable.clone(),
            total_elements,
        }
    }

    pub fn total_elements(&self) -> u64 {
        self.total_elements
    }

    /// Effective page size: the declared size, or the content length for an
    /// unpaged listing.
    pub fn size(&self) -> u64 {
        if self.pageable.is_paged() {
            self.pageable.size
        } else {
            self.content.len() as u64
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.total_elements == 0 {
            return 0;
        }
        match self.size() {
            0 => 1,
            size => (self.total_elements - 1) / size + 1,
        }
    }

    pub fn number(&self) -> u64 {
        self.pageable.page
    }

    pub fn pageable(&self) -> &Pageable {
        &self.pageable
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn has_next(&self) -> bool {
        self.number() + 1 < self.total_pages()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            pageable: self.pageable,
            total_elements: self.total_elements,
        }
    }
}

#[derive(Serialize)]
struct PageBody<'a, T> {
    content: &'a [T],
    page: u64,
    size: u64,
    total_elements: u64,
    total_pages: u64,
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PageBody {
            content: &self.content,
            page: self.number(),
            size: self.size(),
            total_elements: self.total_elements,
            total_pages: self.total_pages(),
        }
        .serialize(serializer)
    }
}
