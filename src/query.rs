//! Listing query: filter predicate, sort, and page window parsed from query parameters.

use crate::error::AppError;
use crate::model::{Role, Status, User};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Conjunction of optional filters. An absent filter places no constraint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserFilter {
    /// Case-insensitive literal substring of `name`.
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<Status>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(role) = self.role {
            if user.role != role {
                return false;
            }
        }
        if let Some(status) = self.status {
            if user.status != status {
                return false;
            }
        }
        if let Some(ref needle) = self.search {
            if !user.name.to_lowercase().contains(&needle.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Email,
    Role,
    Status,
    Salary,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Role => "role",
            SortField::Status => "status",
            SortField::Salary => "salary",
        }
    }
}

impl FromStr for SortField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "id" => SortField::Id,
            "name" => SortField::Name,
            "email" => SortField::Email,
            "role" => SortField::Role,
            "status" => SortField::Status,
            "salary" => SortField::Salary,
            _ => return Err(()),
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListQuery {
    pub filter: UserFilter,
    /// `None` when the requested sort key is not a user field; rows then come back in id order.
    pub sort_by: Option<SortField>,
    pub sort_order: SortOrder,
    pub page: u32,
    pub per_page: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        ListQuery {
            filter: UserFilter::default(),
            sort_by: Some(SortField::Name),
            sort_order: SortOrder::Asc,
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl ListQuery {
    /// Parse `page`, `per_page`, `q`, `role`, `status`, `sortBy`, `sortOrder`. Unknown keys are ignored.
    pub fn from_params(params: &HashMap<String, String>, max_per_page: u32) -> Result<Self, AppError> {
        let mut query = ListQuery::default();

        if let Some(v) = non_empty(params.get("page")) {
            query.page = parse_positive("page", v)?;
        }
        if let Some(v) = non_empty(params.get("per_page")) {
            query.per_page = parse_positive("per_page", v)?;
            if query.per_page > max_per_page {
                return Err(AppError::BadRequest(format!(
                    "per_page must be at most {}",
                    max_per_page
                )));
            }
        }
        query.filter.search = non_empty(params.get("q")).map(str::to_string);
        if let Some(v) = non_empty(params.get("role")) {
            let role = v
                .parse::<Role>()
                .map_err(|_| AppError::BadRequest(format!("unknown role '{}'", v)))?;
            query.filter.role = Some(role);
        }
        if let Some(v) = non_empty(params.get("status")) {
            let status = v
                .parse::<Status>()
                .map_err(|_| AppError::BadRequest(format!("unknown status '{}'", v)))?;
            query.filter.status = Some(status);
        }
        if let Some(v) = non_empty(params.get("sortBy")) {
            query.sort_by = v.parse().ok();
        }
        if params.get("sortOrder").map(String::as_str) == Some("desc") {
            query.sort_order = SortOrder::Desc;
        }
        Ok(query)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.per_page))
    }

    /// Ordering used by in-process stores; mirrors the SQL `ORDER BY <field>, id`.
    pub fn compare(&self, a: &User, b: &User) -> Ordering {
        let primary = match self.sort_by {
            None => Ordering::Equal,
            Some(SortField::Id) => a.id.cmp(&b.id),
            Some(SortField::Name) => a.name.cmp(&b.name),
            Some(SortField::Email) => a.email.cmp(&b.email),
            Some(SortField::Role) => a.role.as_str().cmp(b.role.as_str()),
            Some(SortField::Status) => a.status.as_str().cmp(b.status.as_str()),
            Some(SortField::Salary) => a.salary.total_cmp(&b.salary),
        };
        let primary = match self.sort_order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then(a.id.cmp(&b.id))
    }
}

fn non_empty(v: Option<&String>) -> Option<&str> {
    v.map(String::as_str).filter(|s| !s.is_empty())
}

fn parse_positive(key: &str, v: &str) -> Result<u32, AppError> {
    match v.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::BadRequest(format!("{} must be a positive integer", key))),
    }
}
