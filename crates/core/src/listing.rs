//! Index-page query normalisation: search, sorting, pagination and the
//! soft-delete ("trashed") filter.
//!
//! Raw request parameters are untrusted. [`ListOptions::resolve`] turns them
//! into values that are safe to splice into SQL: the sort column always
//! comes from a per-entity whitelist and the page size from a fixed set.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Page sizes offered by the admin UI.
pub const PER_PAGE_OPTIONS: &[i64] = &[10, 15, 25, 50, 100];

pub const DEFAULT_PER_PAGE: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Which rows to include with respect to soft deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrashedFilter {
    /// Live rows only.
    #[default]
    Without,
    /// Soft-deleted rows only.
    Only,
    /// Both.
    With,
}

impl TrashedFilter {
    /// Accepts the UI's `0` / `1` toggle as well as `without` / `only` /
    /// `with`.
    pub fn parse(value: Option<&str>) -> Result<Self, CoreError> {
        match value.map(str::trim) {
            None | Some("") | Some("0") | Some("without") => Ok(TrashedFilter::Without),
            Some("1") | Some("only") => Ok(TrashedFilter::Only),
            Some("with") | Some("all") => Ok(TrashedFilter::With),
            Some(other) => Err(CoreError::Validation(format!(
                "Invalid trashed filter '{other}'. Use without, only or with"
            ))),
        }
    }

    /// SQL predicate on `deleted_at` for this filter, if any.
    pub fn sql_condition(self, column: &str) -> Option<String> {
        match self {
            TrashedFilter::Without => Some(format!("{column} IS NULL")),
            TrashedFilter::Only => Some(format!("{column} IS NOT NULL")),
            TrashedFilter::With => None,
        }
    }
}

/// Whitelisted sort columns for one entity.
#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub allowed: &'static [&'static str],
    pub default_field: &'static str,
    pub default_direction: SortDirection,
}

/// Raw index parameters as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<String>,
    pub per_page: Option<i64>,
    pub page: Option<i64>,
    pub trashed: Option<String>,
}

/// Normalised index parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    pub search: Option<String>,
    pub sort_field: &'static str,
    pub sort_direction: SortDirection,
    pub per_page: i64,
    pub page: i64,
    pub trashed: TrashedFilter,
}

impl ListOptions {
    /// Normalise raw parameters against an entity's [`SortSpec`].
    ///
    /// Unknown sort fields fall back to the default, page sizes outside
    /// [`PER_PAGE_OPTIONS`] snap to [`DEFAULT_PER_PAGE`], pages below 1
    /// become 1. Only an unrecognised trashed filter is an error.
    pub fn resolve(params: &ListParams, spec: &SortSpec) -> Result<Self, CoreError> {
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let sort_field = params
            .sort_field
            .as_deref()
            .and_then(|f| spec.allowed.iter().find(|a| **a == f).copied())
            .unwrap_or(spec.default_field);

        let sort_direction = params
            .sort_direction
            .as_deref()
            .and_then(SortDirection::parse)
            .unwrap_or(spec.default_direction);

        let per_page = params
            .per_page
            .filter(|p| PER_PAGE_OPTIONS.contains(p))
            .unwrap_or(DEFAULT_PER_PAGE);

        let page = params.page.unwrap_or(1).max(1);
        let trashed = TrashedFilter::parse(params.trashed.as_deref())?;

        Ok(Self {
            search,
            sort_field,
            sort_direction,
            per_page,
            page,
            trashed,
        })
    }

    /// Options for unpaginated exports: same filters and ordering, no limit.
    pub fn for_export(params: &ListParams, spec: &SortSpec) -> Result<Self, CoreError> {
        let mut options = Self::resolve(params, spec)?;
        options.page = 1;
        options.per_page = i64::MAX;
        Ok(options)
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }

    /// `ORDER BY` body. `id` breaks ties so pagination is stable.
    pub fn order_by(&self, table_alias: Option<&str>) -> String {
        let prefix = table_alias.map(|a| format!("{a}.")).unwrap_or_default();
        let dir = self.sort_direction.as_sql();
        format!("{prefix}{} {dir}, {prefix}id {dir}", self.sort_field)
    }

    /// `ILIKE` pattern for the search term with wildcards escaped.
    pub fn search_pattern(&self) -> Option<String> {
        self.search.as_deref().map(like_pattern)
    }
}

/// Wrap `term` in `%` after escaping `\`, `%` and `_`.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Pagination metadata returned with every index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
    /// 1-based index of the first row on this page, `None` when empty.
    pub from: Option<i64>,
    pub to: Option<i64>,
}

impl PageMeta {
    pub fn new(total: i64, rows_on_page: usize, options: &ListOptions) -> Self {
        let per_page = options.per_page.max(1);
        let last_page = if total == 0 {
            1
        } else {
            (total + per_page - 1) / per_page
        };
        let (from, to) = if rows_on_page == 0 {
            (None, None)
        } else {
            let from = options.offset() + 1;
            (Some(from), Some(from + rows_on_page as i64 - 1))
        };
        Self {
            current_page: options.page,
            per_page: options.per_page,
            total,
            last_page,
            from,
            to,
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T: Serialize> Page<T> {
    pub fn new(data: Vec<T>, total: i64, options: &ListOptions) -> Self {
        let meta = PageMeta::new(total, data.len(), options);
        Self { data, meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const SPEC: SortSpec = SortSpec {
        allowed: &["title", "created_at", "status"],
        default_field: "created_at",
        default_direction: SortDirection::Desc,
    };

    #[test]
    fn defaults_when_nothing_given() {
        let opts = ListOptions::resolve(&ListParams::default(), &SPEC).unwrap();
        assert_eq!(opts.sort_field, "created_at");
        assert_eq!(opts.sort_direction, SortDirection::Desc);
        assert_eq!(opts.per_page, DEFAULT_PER_PAGE);
        assert_eq!(opts.page, 1);
        assert_eq!(opts.trashed, TrashedFilter::Without);
        assert!(opts.search.is_none());
    }

    #[test]
    fn unknown_sort_field_falls_back() {
        let params = ListParams {
            sort_field: Some("id; DROP TABLE calls".to_string()),
            ..Default::default()
        };
        let opts = ListOptions::resolve(&params, &SPEC).unwrap();
        assert_eq!(opts.sort_field, "created_at");
    }

    #[test]
    fn whitelisted_sort_is_used() {
        let params = ListParams {
            sort_field: Some("title".to_string()),
            sort_direction: Some("ASC".to_string()),
            ..Default::default()
        };
        let opts = ListOptions::resolve(&params, &SPEC).unwrap();
        assert_eq!(opts.order_by(Some("c")), "c.title ASC, c.id ASC");
        assert_eq!(opts.order_by(None), "title ASC, id ASC");
    }

    #[test]
    fn per_page_snaps_to_options() {
        let params = ListParams {
            per_page: Some(7),
            ..Default::default()
        };
        assert_eq!(ListOptions::resolve(&params, &SPEC).unwrap().per_page, 15);

        let params = ListParams {
            per_page: Some(50),
            ..Default::default()
        };
        assert_eq!(ListOptions::resolve(&params, &SPEC).unwrap().per_page, 50);
    }

    #[test]
    fn page_is_at_least_one() {
        let params = ListParams {
            page: Some(-3),
            ..Default::default()
        };
        let opts = ListOptions::resolve(&params, &SPEC).unwrap();
        assert_eq!(opts.page, 1);
        assert_eq!(opts.offset(), 0);
    }

    #[test]
    fn offset_uses_page_size() {
        let params = ListParams {
            page: Some(3),
            per_page: Some(10),
            ..Default::default()
        };
        assert_eq!(ListOptions::resolve(&params, &SPEC).unwrap().offset(), 20);
    }

    #[test]
    fn blank_search_is_ignored() {
        let params = ListParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(ListOptions::resolve(&params, &SPEC).unwrap().search.is_none());
    }

    #[test]
    fn search_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn trashed_filter_parsing() {
        assert_eq!(TrashedFilter::parse(Some("1")).unwrap(), TrashedFilter::Only);
        assert_eq!(TrashedFilter::parse(Some("0")).unwrap(), TrashedFilter::Without);
        assert_eq!(TrashedFilter::parse(Some("all")).unwrap(), TrashedFilter::With);
        assert_matches!(TrashedFilter::parse(Some("yes")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn trashed_sql_condition() {
        assert_eq!(
            TrashedFilter::Only.sql_condition("c.deleted_at").as_deref(),
            Some("c.deleted_at IS NOT NULL")
        );
        assert!(TrashedFilter::With.sql_condition("deleted_at").is_none());
    }

    #[test]
    fn page_meta_computes_bounds() {
        let params = ListParams {
            page: Some(2),
            per_page: Some(10),
            ..Default::default()
        };
        let opts = ListOptions::resolve(&params, &SPEC).unwrap();
        let meta = PageMeta::new(23, 10, &opts);
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.from, Some(11));
        assert_eq!(meta.to, Some(20));
    }

    #[test]
    fn empty_page_meta() {
        let opts = ListOptions::resolve(&ListParams::default(), &SPEC).unwrap();
        let meta = PageMeta::new(0, 0, &opts);
        assert_eq!(meta.last_page, 1);
        assert_eq!(meta.from, None);
    }

    #[test]
    fn export_options_are_unbounded() {
        let opts = ListOptions::for_export(&ListParams::default(), &SPEC).unwrap();
        assert_eq!(opts.offset(), 0);
        assert_eq!(opts.per_page, i64::MAX);
    }
}
