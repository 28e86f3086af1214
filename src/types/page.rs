use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Larger pages are clamped so the row offset always fits in an i64.
pub const MAX_PAGE: u64 = i64::MAX as u64 / MAX_PAGE_SIZE;
pub const DEFAULT_PAGE_SORT: &str = "created_at desc";

/// Pagination as it arrives in the query string. Values that are missing,
/// not a number or not positive fall back to the defaults.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageRequest {
    /// Page number, starting at 1.
    #[param(value_type = Option<u64>, example = 1)]
    pub page: Option<String>,

    /// Page size, at most 100.
    #[param(value_type = Option<u64>, example = 10)]
    pub size: Option<String>,

    /// `<column> [asc|desc]`, e.g. `created_at desc`.
    #[param(example = "created_at desc")]
    pub sort: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid sort '{0}', expect '<column> [asc|desc]' with column one of: id, name, email, phone, city, created_at, updated_at")]
pub struct InvalidSort(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    Name,
    Email,
    Phone,
    City,
    CreatedAt,
    UpdatedAt,
}

impl SortColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Name => "name",
            SortColumn::Email => "email",
            SortColumn::Phone => "phone",
            SortColumn::City => "city",
            SortColumn::CreatedAt => "created_at",
            SortColumn::UpdatedAt => "updated_at",
        }
    }
}

/// A whitelisted sort order, safe to splice into SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: SortColumn,
    pub desc: bool,
}

impl FromStr for Sort {
    type Err = InvalidSort;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSort(s.to_string());

        let mut fields = s.split_whitespace();
        let column = match fields.next().ok_or_else(invalid)?.to_lowercase().as_str() {
            "id" => SortColumn::Id,
            "name" => SortColumn::Name,
            "email" => SortColumn::Email,
            "phone" => SortColumn::Phone,
            "city" => SortColumn::City,
            "created_at" => SortColumn::CreatedAt,
            "updated_at" => SortColumn::UpdatedAt,
            _ => return Err(invalid()),
        };

        let desc = match fields.next().map(|dir| dir.to_lowercase()) {
            None => false,
            Some(dir) if dir == "asc" => false,
            Some(dir) if dir == "desc" => true,
            Some(_) => return Err(invalid()),
        };

        if fields.next().is_some() {
            return Err(invalid());
        }

        Ok(Self { column, desc })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.desc { "DESC" } else { "ASC" };
        write!(f, "{} {dir}", self.column.as_str())
    }
}

/// Resolved pagination handed to the database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageQuery {
    pub page: u64,
    pub size: u64,
    pub sort: Sort,
}

impl PageQuery {
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.size
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            sort: Sort {
                column: SortColumn::CreatedAt,
                desc: true,
            },
        }
    }
}

impl PageRequest {
    pub fn resolve(&self) -> Result<PageQuery, InvalidSort> {
        let page = Self::positive(&self.page)
            .unwrap_or(DEFAULT_PAGE)
            .min(MAX_PAGE);
        let size = Self::positive(&self.size)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);

        let sort = match self.sort.as_deref().map(str::trim) {
            Some(sort) if !sort.is_empty() => sort.parse()?,
            _ => DEFAULT_PAGE_SORT.parse()?,
        };

        Ok(PageQuery { page, size, sort })
    }

    fn positive(value: &Option<String>) -> Option<u64> {
        let value = value.as_deref()?.trim().parse::<i64>().ok()?;
        if value <= 0 {
            return None;
        }
        Some(value as u64)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}
