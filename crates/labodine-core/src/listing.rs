//! # List Filter / Sort / Paginate
//!
//! Every back-office list page does the same three steps over records it
//! already holds in memory.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   records ──► filter (AND of active criteria) ──► sort? ──► Page<T>    │
//! │                                                                         │
//! │   • An unset criterion passes everything.                               │
//! │   • Sorting is by one numeric key and is stable on ties.                │
//! │   • The requested page is clamped to [1, total_pages].                  │
//! │                                                                         │
//! │   View                 Query                    Page size               │
//! │   ────                 ─────                    ─────────               │
//! │   Product list         ProductQuery             8                       │
//! │   Cashier catalog      CatalogQuery             unpaginated             │
//! │   Raw-material list    RawMaterialQuery         8                       │
//! │   Income list          IncomeQuery              15                      │
//! │   Expense list         ExpenseQuery             15                      │
//! │   Dashboard checkouts  DashboardCheckoutQuery   unpaginated             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{CheckoutRecord, ExpenseEntry, PaymentMethod, Product, RawMaterial};

// =============================================================================
// Generic Building Blocks
// =============================================================================

/// A conjunctive set of criteria over records of type `T`.
pub trait RecordFilter<T> {
    /// True when the record passes every active criterion.
    fn matches(&self, record: &T) -> bool;
}

/// Keeps the records that pass `filter`, in their original order.
pub fn filter_records<T, F>(records: &[T], filter: &F) -> Vec<T>
where
    T: Clone,
    F: RecordFilter<T> + ?Sized,
{
    records.iter().filter(|r| filter.matches(r)).cloned().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Sorts by a single key. Ties keep their original relative order.
pub fn sort_stable_by_key<T, K, F>(items: &mut [T], direction: SortDirection, key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    match direction {
        SortDirection::Ascending => items.sort_by(|a, b| key(a).cmp(&key(b))),
        SortDirection::Descending => items.sort_by(|a, b| key(b).cmp(&key(a))),
    }
}

/// Case-insensitive substring match. A blank needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Exact match against an optional criterion. `None` and `""` pass.
fn equals_if_set(value: &str, criterion: Option<&str>) -> bool {
    match criterion.map(str::trim) {
        None | Some("") => true,
        Some(c) => value == c,
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, after clamping.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    /// Always at least 1, even for an empty list.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Slices `items` into the requested page.
    ///
    /// `page` is clamped to `[1, ceil(len / page_size)]`. A `page_size` of
    /// zero puts everything on a single page.
    pub fn paginate(items: Vec<T>, page: usize, page_size: usize) -> Self {
        let total_items = items.len();

        if page_size == 0 {
            return Page {
                items,
                page: 1,
                page_size: total_items,
                total_items,
                total_pages: 1,
            };
        }

        let total_pages = total_items.div_ceil(page_size).max(1);
        let page = page.clamp(1, total_pages);
        let start = (page - 1) * page_size;

        let items = items.into_iter().skip(start).take(page_size).collect();

        Page {
            items,
            page,
            page_size,
            total_items,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Maps items while keeping the page metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

// =============================================================================
// Date Criteria
// =============================================================================

/// Month and/or year criterion. Each part is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MonthYear {
    /// 1..=12
    pub month: Option<u32>,
    pub year: Option<i32>,
}

impl MonthYear {
    pub fn new(month: Option<u32>, year: Option<i32>) -> Result<Self, ValidationError> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(ValidationError::OutOfRange {
                    field: "month".to_string(),
                    min: 1,
                    max: 12,
                });
            }
        }
        Ok(MonthYear { month, year })
    }

    /// Parses the value of a month picker, `"2025-03"`.
    pub fn parse_year_month(input: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidFormat {
            field: "month".to_string(),
            reason: format!("expected YYYY-MM, got {input:?}"),
        };

        let (year, month) = input.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthYear::new(Some(month), Some(year))
    }

    pub fn is_unset(&self) -> bool {
        self.month.is_none() && self.year.is_none()
    }

    /// Buckets `at` by the store's calendar. Undated records only pass an
    /// unset criterion.
    pub fn matches(&self, at: Option<DateTime<Utc>>, offset: FixedOffset) -> bool {
        if self.is_unset() {
            return true;
        }
        let Some(day) = local_day(at, offset) else {
            return false;
        };
        self.month.is_none_or(|m| day.month() == m) && self.year.is_none_or(|y| day.year() == y)
    }
}

/// Inclusive calendar-day range. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DateRange {
    #[ts(as = "Option<String>")]
    pub start: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_unset(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Compares on the store's calendar day, so the whole `end` day is
    /// included.
    pub fn matches(&self, at: Option<DateTime<Utc>>, offset: FixedOffset) -> bool {
        if self.is_unset() {
            return true;
        }
        let Some(day) = local_day(at, offset) else {
            return false;
        };
        self.start.is_none_or(|s| day >= s) && self.end.is_none_or(|e| day <= e)
    }
}

/// Calendar day of `at` at the given UTC offset.
pub fn local_day(at: Option<DateTime<Utc>>, offset: FixedOffset) -> Option<NaiveDate> {
    at.map(|at| at.with_timezone(&offset).date_naive())
}

/// Offset a query buckets with; queries built without one use UTC.
fn offset_or_utc(offset: Option<FixedOffset>) -> FixedOffset {
    offset.unwrap_or_else(|| Utc.fix())
}

// =============================================================================
// Product List
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub page: usize,
}

impl RecordFilter<Product> for ProductQuery {
    fn matches(&self, p: &Product) -> bool {
        contains_ignore_case(&p.name, &self.search)
            && equals_if_set(&p.category, self.category.as_deref())
    }
}

// =============================================================================
// Cashier Catalog
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSort {
    /// Most units sold first.
    BestSeller,
    PriceLowHigh,
    PriceHighLow,
    /// Largest stock first.
    StockHigh,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_price: Option<Money>,
    #[serde(default)]
    pub max_price: Option<Money>,
    #[serde(default)]
    pub sort: Option<CatalogSort>,
}

impl RecordFilter<Product> for CatalogQuery {
    fn matches(&self, p: &Product) -> bool {
        equals_if_set(&p.category, self.category.as_deref())
            && self.min_price.is_none_or(|min| p.unit_price >= min)
            && self.max_price.is_none_or(|max| p.unit_price <= max)
            && contains_ignore_case(&p.name, &self.search)
    }
}

/// A product card on the cashier page, with its units sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub product: Product,
    /// Units sold across all checkouts (dibeli).
    pub sold: i64,
}

/// Filters and sorts the cashier catalog.
///
/// `sales` maps product id to units sold; missing ids count as zero.
pub fn catalog_view(
    products: &[Product],
    query: &CatalogQuery,
    sales: &HashMap<String, i64>,
) -> Vec<CatalogEntry> {
    let mut entries: Vec<CatalogEntry> = products
        .iter()
        .filter(|p| query.matches(p))
        .map(|p| CatalogEntry {
            product: p.clone(),
            sold: sales.get(&p.id).copied().unwrap_or(0),
        })
        .collect();

    match query.sort {
        Some(CatalogSort::BestSeller) => {
            sort_stable_by_key(&mut entries, SortDirection::Descending, |e| e.sold)
        }
        Some(CatalogSort::PriceLowHigh) => {
            sort_stable_by_key(&mut entries, SortDirection::Ascending, |e| e.product.unit_price)
        }
        Some(CatalogSort::PriceHighLow) => {
            sort_stable_by_key(&mut entries, SortDirection::Descending, |e| e.product.unit_price)
        }
        Some(CatalogSort::StockHigh) => {
            sort_stable_by_key(&mut entries, SortDirection::Descending, |e| e.product.stock)
        }
        None => {}
    }

    entries
}

// =============================================================================
// Raw-Material List
// =============================================================================

/// Stock level bucket on the raw-material page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum StockLevel {
    /// At or below the low threshold (rendah).
    #[serde(rename = "rendah")]
    Low,
    /// Above the low threshold (cukup).
    #[serde(rename = "cukup")]
    Sufficient,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialQuery {
    #[serde(default)]
    pub search: String,
    /// Exact receipt day, on the store calendar.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub entry_kind: Option<String>,
    #[serde(default)]
    pub stock_level: Option<StockLevel>,
    /// Threshold for [`StockLevel`]. Zero means the crate default.
    #[serde(default)]
    pub low_threshold: i64,
    /// Order by quantity (terbesar / terkecil).
    #[serde(default)]
    pub sort: Option<SortDirection>,
    #[serde(default)]
    pub page: usize,
    /// Store timezone used for day and month bucketing. Set by the loader.
    #[serde(skip)]
    #[ts(skip)]
    pub utc_offset: Option<FixedOffset>,
}

impl RawMaterialQuery {
    fn threshold(&self) -> i64 {
        if self.low_threshold > 0 {
            self.low_threshold
        } else {
            crate::RAW_MATERIAL_LOW_LEVEL
        }
    }
}

impl RecordFilter<RawMaterial> for RawMaterialQuery {
    fn matches(&self, m: &RawMaterial) -> bool {
        let date_ok = match self.date {
            None => true,
            Some(day) => local_day(m.date, offset_or_utc(self.utc_offset)) == Some(day),
        };
        let level_ok = match self.stock_level {
            None => true,
            Some(StockLevel::Low) => m.quantity <= self.threshold(),
            Some(StockLevel::Sufficient) => m.quantity > self.threshold(),
        };

        contains_ignore_case(&m.name, &self.search)
            && date_ok
            && equals_if_set(&m.entry_kind, self.entry_kind.as_deref())
            && level_ok
    }
}

/// Filters, sorts and paginates the raw-material list.
pub fn raw_material_page(
    materials: &[RawMaterial],
    query: &RawMaterialQuery,
    page_size: usize,
) -> Page<RawMaterial> {
    let mut rows = filter_records(materials, query);
    if let Some(direction) = query.sort {
        sort_stable_by_key(&mut rows, direction, |m| m.quantity);
    }
    Page::paginate(rows, query.page, page_size)
}

/// Filters and paginates the product list.
pub fn product_page(products: &[Product], query: &ProductQuery, page_size: usize) -> Page<Product> {
    Page::paginate(filter_records(products, query), query.page, page_size)
}

// =============================================================================
// Income (Checkout) List
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IncomeQuery {
    #[serde(default)]
    pub period: MonthYear,
    /// Substring of the payment tag, case-insensitive ("transfer" matches
    /// every bank).
    #[serde(default)]
    pub payment_method: String,
    /// Substring of any line's product name.
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub page: usize,
    /// Store timezone used for day and month bucketing. Set by the loader.
    #[serde(skip)]
    #[ts(skip)]
    pub utc_offset: Option<FixedOffset>,
}

impl RecordFilter<CheckoutRecord> for IncomeQuery {
    fn matches(&self, c: &CheckoutRecord) -> bool {
        self.period.matches(c.created_at, offset_or_utc(self.utc_offset))
            && contains_ignore_case(c.payment_method.tag(), &self.payment_method)
            && (self.product.trim().is_empty() || c.mentions_product(self.product.trim()))
    }
}

// =============================================================================
// Expense List
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub range: DateRange,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub period: MonthYear,
    #[serde(default)]
    pub page: usize,
    /// Store timezone used for day and month bucketing. Set by the loader.
    #[serde(skip)]
    #[ts(skip)]
    pub utc_offset: Option<FixedOffset>,
}

impl RecordFilter<ExpenseEntry> for ExpenseQuery {
    fn matches(&self, e: &ExpenseEntry) -> bool {
        let offset = offset_or_utc(self.utc_offset);
        contains_ignore_case(&e.name, &self.search)
            && self.range.matches(e.date, offset)
            && equals_if_set(&e.kind, self.kind.as_deref())
            && self.period.matches(e.date, offset)
    }
}

// =============================================================================
// Dashboard Checkouts
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCheckoutQuery {
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub range: DateRange,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub period: MonthYear,
    /// Store timezone used for day and month bucketing. Set by the loader.
    #[serde(skip)]
    #[ts(skip)]
    pub utc_offset: Option<FixedOffset>,
}

impl RecordFilter<CheckoutRecord> for DashboardCheckoutQuery {
    fn matches(&self, c: &CheckoutRecord) -> bool {
        let offset = offset_or_utc(self.utc_offset);
        (self.product.trim().is_empty() || c.mentions_product(self.product.trim()))
            && self.range.matches(c.created_at, offset)
            && self.payment_method.is_none_or(|m| c.payment_method == m)
            && self.period.matches(c.created_at, offset)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
