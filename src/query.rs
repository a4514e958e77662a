//! Query-string driven filtering, sorting, includes and pagination.
//!
//! List endpoints accept the JSON:API style parameters the front end sends:
//!
//! ```text
//! ?filter[status_id]=1,2&filter[title]=lease&sort=-created_at,title
//!  &include=owner,template&page[number]=2&page[size]=10
//! ```
//!
//! [`ListQuery`] holds the parsed parameters. Each endpoint declares what it
//! allows and turns the filters into `SeaORM` conditions with the helpers below.
//! Anything not on the allow-list is rejected with `Error::InvalidQuery`.

use crate::config::settings::PaginationConfig;
use crate::errors::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::sea_query::SimpleExpr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait, QueryOrder, Select,
};
use std::collections::{BTreeMap, BTreeSet};

/// One `sort` entry
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    /// Field name as written in the query string, without the `-` prefix
    pub field: String,
    /// Ascending unless prefixed with `-`
    pub order: Order,
}

/// 1-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub number: u64,
    /// Rows per page
    pub size: u64,
}

/// Parsed list parameters
#[derive(Debug, Clone)]
pub struct ListQuery {
    filters: BTreeMap<String, String>,
    sorts: Vec<Sort>,
    includes: BTreeSet<String>,
    params: BTreeMap<String, String>,
    page: PageRequest,
}

fn bracketed<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)?
        .strip_prefix('[')?
        .strip_suffix(']')
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn not_allowed(kind: &str, requested: &[&str], allowed: &[&str]) -> Error {
    Error::InvalidQuery {
        message: format!(
            "Requested {kind}(s) `{}` are not allowed. Allowed {kind}(s) are `{}`.",
            requested.join(", "),
            allowed.join(", ")
        ),
    }
}

impl ListQuery {
    /// Builds a query from raw key/value pairs as decoded from the URL.
    pub fn from_pairs(pairs: Vec<(String, String)>, pagination: PaginationConfig) -> Self {
        let mut filters = BTreeMap::new();
        let mut sorts = Vec::new();
        let mut includes = BTreeSet::new();
        let mut params = BTreeMap::new();
        let mut number = 1;
        let mut size = pagination.default_size;

        for (key, value) in pairs {
            if let Some(name) = bracketed(&key, "filter") {
                filters.insert(name.to_string(), value);
            } else if let Some(name) = bracketed(&key, "page") {
                match (name, value.parse::<u64>()) {
                    ("number", Ok(n)) => number = n.max(1),
                    ("size", Ok(n)) => size = n,
                    _ => {}
                }
            } else if key == "sort" {
                sorts.extend(split_list(&value).map(|field| match field.strip_prefix('-') {
                    Some(desc) => Sort {
                        field: desc.to_string(),
                        order: Order::Desc,
                    },
                    None => Sort {
                        field: field.to_string(),
                        order: Order::Asc,
                    },
                }));
            } else if key == "include" {
                includes.extend(split_list(&value).map(str::to_string));
            } else {
                params.insert(key, value);
            }
        }

        let size = size.clamp(1, pagination.max_size.max(1));
        Self {
            filters,
            sorts,
            includes,
            params,
            page: PageRequest { number, size },
        }
    }

    /// Rejects filters that are not in `allowed`.
    ///
    /// # Errors
    /// Returns `Error::InvalidQuery` naming the offending filters.
    pub fn allow_filters(&self, allowed: &[&str]) -> Result<()> {
        let unknown: Vec<&str> = self
            .filters
            .keys()
            .map(String::as_str)
            .filter(|f| !allowed.contains(f))
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(not_allowed("filter", &unknown, allowed))
        }
    }

    /// Rejects sorts that are not in `allowed`.
    ///
    /// # Errors
    /// Returns `Error::InvalidQuery` naming the offending sorts.
    pub fn allow_sorts(&self, allowed: &[&str]) -> Result<()> {
        let unknown: Vec<&str> = self
            .sorts
            .iter()
            .map(|s| s.field.as_str())
            .filter(|f| !allowed.contains(f))
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(not_allowed("sort", &unknown, allowed))
        }
    }

    /// Rejects includes that are not in `allowed`.
    ///
    /// # Errors
    /// Returns `Error::InvalidQuery` naming the offending includes.
    pub fn allow_includes(&self, allowed: &[&str]) -> Result<()> {
        let unknown: Vec<&str> = self
            .includes
            .iter()
            .map(String::as_str)
            .filter(|i| !allowed.contains(i))
            .collect();
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(not_allowed("include", &unknown, allowed))
        }
    }

    /// Raw value of `filter[name]`
    #[must_use]
    pub fn filter(&self, name: &str) -> Option<&str> {
        self.filters.get(name).map(String::as_str)
    }

    /// Comma separated values of `filter[name]`
    #[must_use]
    pub fn filter_values(&self, name: &str) -> Option<Vec<String>> {
        let values: Vec<String> = split_list(self.filter(name)?).map(str::to_string).collect();
        (!values.is_empty()).then_some(values)
    }

    /// Whether `relation` was requested. A nested include such as
    /// `supplier.admin` also counts as a request for `supplier`.
    #[must_use]
    pub fn includes(&self, relation: &str) -> bool {
        self.includes.iter().any(|i| {
            i == relation
                || i.strip_prefix(relation)
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Any parameter that is not a filter, sort, include or page
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Requested sorts in order
    #[must_use]
    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    /// Requested page
    #[must_use]
    pub const fn page(&self) -> PageRequest {
        self.page
    }

    /// `column LIKE %value%` for a partial filter.
    pub fn partial(&self, name: &str, column: impl ColumnTrait) -> Option<SimpleExpr> {
        self.filter(name).map(|value| column.contains(value))
    }

    /// `column = value`, or `column IN (...)` when several values are given.
    pub fn exact(&self, name: &str, column: impl ColumnTrait) -> Option<SimpleExpr> {
        self.filter_values(name).map(|mut values| {
            if values.len() == 1 {
                column.eq(values.remove(0))
            } else {
                column.is_in(values)
            }
        })
    }

    /// Integer ids of `filter[name]`.
    ///
    /// # Errors
    /// Returns `Error::InvalidQuery` if any value is not an integer.
    pub fn int_values(&self, name: &str) -> Result<Option<Vec<i32>>> {
        self.filter_values(name)
            .map(|values| {
                values
                    .iter()
                    .map(|v| {
                        v.parse::<i32>().map_err(|_| Error::InvalidQuery {
                            message: format!("Filter `{name}` expects integers, got `{v}`."),
                        })
                    })
                    .collect()
            })
            .transpose()
    }

    /// Integer flavour of [`ListQuery::exact`].
    ///
    /// # Errors
    /// Returns `Error::InvalidQuery` if any value is not an integer.
    pub fn exact_int(&self, name: &str, column: impl ColumnTrait) -> Result<Option<SimpleExpr>> {
        Ok(self.int_values(name)?.map(|mut values| {
            if values.len() == 1 {
                column.eq(values.remove(0))
            } else {
                column.is_in(values)
            }
        }))
    }

    /// `column >= value` for a date lower bound.
    ///
    /// # Errors
    /// Returns `Error::InvalidQuery` if the value is not a date.
    pub fn date_from(&self, name: &str, column: impl ColumnTrait) -> Result<Option<SimpleExpr>> {
        Ok(self.date(name)?.map(|d| column.gte(d)))
    }

    /// `column <= value` for a date upper bound.
    ///
    /// # Errors
    /// Returns `Error::InvalidQuery` if the value is not a date.
    pub fn date_to(&self, name: &str, column: impl ColumnTrait) -> Result<Option<SimpleExpr>> {
        Ok(self.date(name)?.map(|d| column.lte(d)))
    }

    fn date(&self, name: &str) -> Result<Option<NaiveDateTime>> {
        self.filter(name)
            .map(|value| {
                parse_datetime(value).ok_or_else(|| Error::InvalidQuery {
                    message: format!("Filter `{name}` expects a date, got `{value}`."),
                })
            })
            .transpose()
    }
}

/// Parses the date formats the front end sends: `2020-11-26`,
/// `2020-11-26 19:01:56`, `2020-11-26T19:01:56` and RFC 3339.
#[must_use]
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Applies the requested sorts using `columns` to map sort names onto
/// columns, falling back to `default` when nothing was requested.
pub fn apply_sorts<E, C>(
    mut select: Select<E>,
    query: &ListQuery,
    columns: &[(&str, C)],
    default: C,
) -> Select<E>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let mut sorted = false;
    for sort in query.sorts() {
        if let Some((_, column)) = columns.iter().find(|(name, _)| *name == sort.field) {
            select = select.order_by(*column, sort.order.clone());
            sorted = true;
        }
    }
    if !sorted {
        select = select.order_by_asc(default);
    }
    select
}

/// One page of results plus the totals needed for pagination links
#[derive(Debug, Clone)]
pub struct Page<M> {
    /// Rows on this page
    pub items: Vec<M>,
    /// Requested page
    pub request: PageRequest,
    /// Rows across all pages
    pub total: u64,
    /// Number of the last page, at least 1
    pub last_page: u64,
}

impl<M> Page<M> {
    /// Transforms every row, keeping the pagination totals.
    pub fn map<T>(self, f: impl FnMut(M) -> T) -> Page<T> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total: self.total,
            last_page: self.last_page,
        }
    }

    /// Same totals with different rows, used after loading relations per row.
    pub fn with_items<T>(&self, items: Vec<T>) -> Page<T> {
        Page {
            items,
            request: self.request,
            total: self.total,
            last_page: self.last_page,
        }
    }
}

/// Runs `select` for the requested page.
pub async fn paginate<E>(
    db: &DatabaseConnection,
    select: Select<E>,
    request: PageRequest,
) -> Result<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync + 'static,
{
    let paginator = select.paginate(db, request.size);
    let totals = paginator.num_items_and_pages().await?;
    // Pages past the end are empty and must not reach the offset arithmetic
    let items = if request.number > totals.number_of_pages {
        Vec::new()
    } else {
        paginator.fetch_page(request.number - 1).await?
    };
    Ok(Page {
        items,
        request,
        total: totals.number_of_items,
        last_page: totals.number_of_pages.max(1),
    })
}
