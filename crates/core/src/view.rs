//! Device list view pipeline: filter, group, sort, paginate.
//!
//! Everything here is a pure function of the record snapshot and the list
//! parameters. Nothing fails: unknown sort fields fall back to defaults and
//! out-of-range pages produce an empty slice.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::device::DeviceRecord;
use crate::grouping::{group_by_itm_code, DeviceGroup};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Items per page when the caller does not ask for a size.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Number of page links shown around the current page.
pub const PAGE_WINDOW: usize = 5;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Free-text search plus an optional exact department match.
#[derive(Debug, Clone, Default)]
pub struct DeviceFilter {
    needle: String,
    department: Option<String>,
}

impl DeviceFilter {
    pub fn new(query: Option<&str>, department: Option<&str>) -> Self {
        Self {
            needle: query.map(str::to_lowercase).unwrap_or_default(),
            department: department.filter(|d| !d.is_empty()).map(str::to_string),
        }
    }

    /// True when the record passes both the search and department predicates.
    pub fn matches(&self, record: &DeviceRecord) -> bool {
        let text_ok = self.needle.is_empty()
            || [
                &record.device_name,
                &record.manufacturer,
                &record.model,
                &record.serial_number,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle));

        let department_ok = self
            .department
            .as_deref()
            .map_or(true, |d| record.department == d);

        text_ok && department_ok
    }

    /// Keep matching records, preserving input order.
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a DeviceRecord>
    where
        I: IntoIterator<Item = &'a DeviceRecord>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

/// Fields the list can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    DeviceName,
    Manufacturer,
    Department,
    DateReceived,
}

impl SortField {
    /// Parse a query-string value, falling back to `deviceName` for anything unknown.
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("manufacturer") => SortField::Manufacturer,
            Some("department") => SortField::Department,
            Some("dateReceived") | Some("date_received") => SortField::DateReceived,
            _ => SortField::DeviceName,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse `asc`/`desc` (case-insensitive), falling back to ascending.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Anything the list view can sort: raw records or derived groups.
pub trait Sortable {
    fn text_key(&self, field: SortField) -> &str;
    fn date_received(&self) -> &str;
}

impl Sortable for DeviceRecord {
    fn text_key(&self, field: SortField) -> &str {
        match field {
            SortField::Manufacturer => &self.manufacturer,
            SortField::Department => &self.department,
            SortField::DeviceName | SortField::DateReceived => &self.device_name,
        }
    }

    fn date_received(&self) -> &str {
        &self.date_received
    }
}

impl Sortable for DeviceGroup {
    fn text_key(&self, field: SortField) -> &str {
        match field {
            SortField::Manufacturer => &self.manufacturer,
            SortField::Department => &self.department,
            SortField::DeviceName | SortField::DateReceived => &self.device_name,
        }
    }

    fn date_received(&self) -> &str {
        &self.date_received
    }
}

/// Stable in-place sort. Ties keep their relative order in both directions.
pub fn sort_items<T: Sortable>(items: &mut [T], field: SortField, order: SortOrder) {
    let compare = |a: &T, b: &T| match field {
        SortField::DateReceived => {
            parse_calendar_date(a.date_received()).cmp(&parse_calendar_date(b.date_received()))
        }
        _ => locale_cmp(a.text_key(field), b.text_key(field)),
    };

    match order {
        SortOrder::Asc => items.sort_by(compare),
        SortOrder::Desc => items.sort_by(|a, b| compare(b, a)),
    }
}

/// Compare strings the way a user-facing list expects.
///
/// Base letters decide first, ignoring case and diacritics, so `Émile`
/// sorts with the `E`s. Unaccented letters then precede accented ones and
/// lowercase precedes uppercase, only to break exact ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| b.cmp(a))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

/// Parse a received date into a calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` and
/// `MM/DD/YYYY`. Anything else is `None`, which orders before every date.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(value, "%m/%d/%Y").ok())
}

// ---------------------------------------------------------------------------
// Paginate
// ---------------------------------------------------------------------------

/// One page of a sorted sequence plus the numbers a pager needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    /// 1-based index of the first item on this page, 0 when empty.
    pub showing_from: usize,
    /// 1-based index of the last item on this page, 0 when empty.
    pub showing_to: usize,
    /// Page numbers to render as links, centred on `page`.
    pub page_window: Vec<usize>,
}

/// Clamp a requested page size to `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: Option<usize>) -> usize {
    page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// Slice `[(page-1)*size, page*size)` out of `items`, clamped to its length.
///
/// Page `0` is served as page 1. A page past the end yields no items.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size).min(total_items);
    let end = page.saturating_mul(page_size).min(total_items);

    let page_items: Vec<T> = items.into_iter().skip(start).take(end - start).collect();
    let (showing_from, showing_to) = if page_items.is_empty() {
        (0, 0)
    } else {
        (start + 1, end)
    };

    Page {
        items: page_items,
        page,
        page_size,
        total_items,
        total_pages,
        showing_from,
        showing_to,
        page_window: page_window(page, total_pages),
    }
}

/// At most [`PAGE_WINDOW`] consecutive page numbers around `current`,
/// shifted left when `current` is near the last page.
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    if total_pages == 0 {
        return Vec::new();
    }
    let half = PAGE_WINDOW / 2;
    let mut start = current.saturating_sub(half).max(1);
    let mut end = start + PAGE_WINDOW - 1;
    if end > total_pages {
        end = total_pages;
        start = end.saturating_sub(PAGE_WINDOW - 1).max(1);
    }
    (start..=end).collect()
}

// ---------------------------------------------------------------------------
// Full list view
// ---------------------------------------------------------------------------

/// Parameters driving one list computation.
#[derive(Debug, Clone)]
pub struct ListParams {
    pub query: Option<String>,
    pub department: Option<String>,
    pub sort: SortField,
    pub order: SortOrder,
    pub page: usize,
    pub page_size: usize,
    /// Group records by `itmCode` before sorting.
    pub grouped: bool,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            query: None,
            department: None,
            sort: SortField::default(),
            order: SortOrder::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            grouped: true,
        }
    }
}

/// Output of [`list_view`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ListView {
    Grouped(Page<DeviceGroup>),
    Records(Page<DeviceRecord>),
}

impl ListView {
    pub fn total_items(&self) -> usize {
        match self {
            ListView::Grouped(page) => page.total_items,
            ListView::Records(page) => page.total_items,
        }
    }
}

/// Run filter, then group (when requested), then sort, then paginate.
pub fn list_view(records: &[DeviceRecord], params: &ListParams) -> ListView {
    let filter = DeviceFilter::new(params.query.as_deref(), params.department.as_deref());
    let filtered = filter.apply(records);

    if params.grouped {
        let mut groups = group_by_itm_code(filtered);
        sort_items(&mut groups, params.sort, params.order);
        ListView::Grouped(paginate(groups, params.page, params.page_size))
    } else {
        let mut flat: Vec<DeviceRecord> = filtered.into_iter().cloned().collect();
        sort_items(&mut flat, params.sort, params.order);
        ListView::Records(paginate(flat, params.page, params.page_size))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
