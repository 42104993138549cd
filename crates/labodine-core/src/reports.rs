//! # Reports
//!
//! Aggregations behind the dashboard, the financial report (Laporan
//! Keuangan), the income list footer and the attendance recap.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Income  = checkouts (Σ total)                                          │
//! │  Expense = pengeluaran entries (Σ jumlah)                               │
//! │  Net     = Income − Expense   (may be negative)                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All functions take records already fetched (and, where relevant, already
//! filtered by a listing query) and never mutate them.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::listing::{sort_stable_by_key, MonthYear, SortDirection};
use crate::money::Money;
use crate::types::{
    AttendanceRecord, AttendanceStatus, CheckoutRecord, ExpenseEntry, Gender, Product, RawMaterial,
};

// =============================================================================
// Income Footer
// =============================================================================

/// Footer of the income list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IncomeTotals {
    pub count: usize,
    pub total: Money,
    /// Units sold across every line.
    pub quantity: i64,
}

impl IncomeTotals {
    pub fn from_records(records: &[CheckoutRecord]) -> Self {
        IncomeTotals {
            count: records.len(),
            total: records.iter().map(|c| c.total).sum(),
            quantity: records.iter().map(CheckoutRecord::total_quantity).sum(),
        }
    }
}

/// Σ amount over expense entries.
pub fn expense_total(entries: &[ExpenseEntry]) -> Money {
    entries.iter().map(|e| e.amount).sum()
}

// =============================================================================
// Financial Summary
// =============================================================================

/// The financial report for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub period: MonthYear,
    pub total_income: Money,
    pub total_expense: Money,
    /// Income minus expense.
    pub net: Money,
    pub income_count: usize,
    pub expense_count: usize,
    pub highest_income: Option<CheckoutRecord>,
    pub highest_expense: Option<ExpenseEntry>,
    pub income_preview: Vec<CheckoutRecord>,
    pub expense_preview: Vec<ExpenseEntry>,
}

/// Builds the financial report.
///
/// Checkouts are dated by `createdAt`, expenses by `tanggal`, both on the
/// calendar at `offset`. Ties for the highest entry go to the first one
/// listed.
pub fn financial_summary(
    checkouts: &[CheckoutRecord],
    expenses: &[ExpenseEntry],
    period: MonthYear,
    offset: FixedOffset,
    preview_len: usize,
) -> FinancialSummary {
    let income: Vec<&CheckoutRecord> = checkouts
        .iter()
        .filter(|c| period.matches(c.created_at, offset))
        .collect();
    let expense: Vec<&ExpenseEntry> = expenses
        .iter()
        .filter(|e| period.matches(e.date, offset))
        .collect();

    let total_income: Money = income.iter().map(|c| c.total).sum();
    let total_expense: Money = expense.iter().map(|e| e.amount).sum();

    FinancialSummary {
        period,
        total_income,
        total_expense,
        net: total_income - total_expense,
        income_count: income.len(),
        expense_count: expense.len(),
        highest_income: first_max_by_key(&income, |c| c.total).map(|c| (*c).clone()),
        highest_expense: first_max_by_key(&expense, |e| e.amount).map(|e| (*e).clone()),
        income_preview: income.iter().take(preview_len).map(|c| (*c).clone()).collect(),
        expense_preview: expense.iter().take(preview_len).map(|e| (*e).clone()).collect(),
    }
}

/// `Iterator::max_by_key` returns the last maximum; the report wants the first.
fn first_max_by_key<T, K: Ord, F: Fn(&T) -> K>(items: &[T], key: F) -> Option<&T> {
    items.iter().fold(None, |best, item| match best {
        Some(b) if key(b) >= key(item) => Some(b),
        _ => Some(item),
    })
}

// =============================================================================
// Dashboard
// =============================================================================

/// Customers per gender. Checkouts without a gender are counted apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct GenderBreakdown {
    #[serde(rename = "Pria")]
    pub male: usize,
    #[serde(rename = "Wanita")]
    pub female: usize,
    pub unspecified: usize,
}

impl GenderBreakdown {
    pub fn from_checkouts(checkouts: &[CheckoutRecord]) -> Self {
        checkouts
            .iter()
            .fold(GenderBreakdown::default(), |mut acc, c| {
                match c.customer_gender {
                    Some(Gender::Male) => acc.male += 1,
                    Some(Gender::Female) => acc.female += 1,
                    None => acc.unspecified += 1,
                }
                acc
            })
    }
}

/// Units sold for one product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub name: String,
    pub quantity: i64,
}

/// Units sold per product name, best first, ties in first-seen order.
pub fn product_leaderboard(checkouts: &[CheckoutRecord], top_n: usize) -> Vec<ProductSales> {
    let mut order: Vec<ProductSales> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in checkouts.iter().flat_map(|c| c.cart_items.iter()) {
        match index.get(item.name.as_str()) {
            Some(&i) => order[i].quantity += item.quantity,
            None => {
                index.insert(item.name.as_str(), order.len());
                order.push(ProductSales {
                    name: item.name.clone(),
                    quantity: item.quantity,
                });
            }
        }
    }

    sort_stable_by_key(&mut order, SortDirection::Descending, |p| p.quantity);
    order.truncate(top_n);
    order
}

/// Units sold per product id. Drives the cashier's best-seller sort.
pub fn sales_by_product(checkouts: &[CheckoutRecord]) -> HashMap<String, i64> {
    let mut sales = HashMap::new();
    for item in checkouts.iter().flat_map(|c| c.cart_items.iter()) {
        *sales.entry(item.product_id.clone()).or_insert(0) += item.quantity;
    }
    sales
}

/// What a stock notice or a recent item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockItemKind {
    Product,
    RawMaterial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LowStockNotice {
    pub kind: StockItemKind,
    pub id: String,
    pub name: String,
    pub stock: i64,
}

/// Products first, then raw materials, each in list order.
pub fn low_stock_notices(
    products: &[Product],
    materials: &[RawMaterial],
    threshold: i64,
) -> Vec<LowStockNotice> {
    let products = products
        .iter()
        .filter(|p| p.is_low_stock(threshold))
        .map(|p| LowStockNotice {
            kind: StockItemKind::Product,
            id: p.id.clone(),
            name: p.name.clone(),
            stock: p.stock,
        });
    let materials = materials
        .iter()
        .filter(|m| m.quantity < threshold)
        .map(|m| LowStockNotice {
            kind: StockItemKind::RawMaterial,
            id: m.id.clone(),
            name: m.name.clone(),
            stock: m.quantity,
        });
    products.chain(materials).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct RecentItem {
    pub kind: StockItemKind,
    pub id: String,
    pub name: String,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

/// The `limit` newest products and raw materials by `createdAt`.
/// Undated records sort last.
pub fn recently_added(
    products: &[Product],
    materials: &[RawMaterial],
    limit: usize,
) -> Vec<RecentItem> {
    let mut items: Vec<RecentItem> = products
        .iter()
        .map(|p| RecentItem {
            kind: StockItemKind::Product,
            id: p.id.clone(),
            name: p.name.clone(),
            created_at: p.created_at,
        })
        .chain(materials.iter().map(|m| RecentItem {
            kind: StockItemKind::RawMaterial,
            id: m.id.clone(),
            name: m.name.clone(),
            created_at: m.created_at,
        }))
        .collect();

    // None < Some, so descending puts undated items at the end.
    sort_stable_by_key(&mut items, SortDirection::Descending, |i| i.created_at);
    items.truncate(limit);
    items
}

/// Knobs for [`dashboard_summary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    pub low_stock_threshold: i64,
    pub top_n: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        DashboardOptions {
            low_stock_threshold: crate::LOW_STOCK_THRESHOLD,
            top_n: crate::DASHBOARD_TOP_N,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: usize,
    pub total_raw_materials: usize,
    pub checkout_count: usize,
    pub total_income: Money,
    pub gender: GenderBreakdown,
    pub top_products: Vec<ProductSales>,
    pub low_stock: Vec<LowStockNotice>,
    pub recently_added: Vec<RecentItem>,
}

/// Builds the dashboard from the catalog and the (filtered) checkouts.
pub fn dashboard_summary(
    products: &[Product],
    materials: &[RawMaterial],
    checkouts: &[CheckoutRecord],
    options: DashboardOptions,
) -> DashboardSummary {
    DashboardSummary {
        total_products: products.len(),
        total_raw_materials: materials.len(),
        checkout_count: checkouts.len(),
        total_income: checkouts.iter().map(|c| c.total).sum(),
        gender: GenderBreakdown::from_checkouts(checkouts),
        top_products: product_leaderboard(checkouts, options.top_n),
        low_stock: low_stock_notices(products, materials, options.low_stock_threshold),
        recently_added: recently_added(products, materials, options.top_n),
    }
}

// =============================================================================
// Attendance Recap
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecap {
    pub employee_id: String,
    pub employee_name: String,
    /// hadir
    pub present: u32,
    /// izin
    pub excused: u32,
    /// sakit
    pub sick: u32,
    /// alpa
    pub absent: u32,
}

impl AttendanceRecap {
    fn new(employee_id: &str, employee_name: &str) -> Self {
        AttendanceRecap {
            employee_id: employee_id.to_string(),
            employee_name: employee_name.to_string(),
            present: 0,
            excused: 0,
            sick: 0,
            absent: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.present + self.excused + self.sick + self.absent
    }
}

/// Per-employee status counts for one month of the store calendar at
/// `offset`, in first-seen order.
///
/// Records with an unrecognised status are skipped without creating a row.
pub fn attendance_recap(
    records: &[AttendanceRecord],
    month: u32,
    year: i32,
    offset: FixedOffset,
) -> Vec<AttendanceRecap> {
    let mut rows: Vec<AttendanceRecap> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let day = record.created_at.with_timezone(&offset).date_naive();
        if day.month() != month || day.year() != year {
            continue;
        }
        let Some(status) = record.parsed_status() else {
            continue;
        };

        let i = *index.entry(record.employee_id.as_str()).or_insert_with(|| {
            rows.push(AttendanceRecap::new(&record.employee_id, &record.employee_name));
            rows.len() - 1
        });

        let row = &mut rows[i];
        match status {
            AttendanceStatus::Present => row.present += 1,
            AttendanceStatus::Excused => row.excused += 1,
            AttendanceStatus::Sick => row.sick += 1,
            AttendanceStatus::Absent => row.absent += 1,
        }
    }

    rows
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartLineItem;
    use crate::types::{DiscountPercent, PaymentMethod};
    use chrono::{Offset, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn line(id: &str, name: &str, qty: i64) -> CartLineItem {
        CartLineItem {
            product_id: id.to_string(),
            name: name.to_string(),
            unit_price: Money::from_rupiah(10_000),
            quantity: qty,
            stock: 0,
        }
    }

    fn checkout(
        id: &str,
        total: i64,
        gender: Option<Gender>,
        lines: Vec<CartLineItem>,
        created: DateTime<Utc>,
    ) -> CheckoutRecord {
        CheckoutRecord {
            id: id.to_string(),
            cart_items: lines,
            payment_method: PaymentMethod::Cash,
            customer_gender: gender,
            customer_number: String::new(),
            discount_percent: DiscountPercent::zero(),
            subtotal: Money::from_rupiah(total),
            total: Money::from_rupiah(total),
            cashier: "sinta".to_string(),
            created_at: Some(created),
        }
    }

    fn expense(id: &str, amount: i64, date: DateTime<Utc>) -> ExpenseEntry {
        ExpenseEntry {
            id: id.to_string(),
            name: format!("Pengeluaran {id}"),
            amount: Money::from_rupiah(amount),
            kind: "Operasional".to_string(),
            note: String::new(),
            date: Some(date),
        }
    }

    #[test]
    fn test_income_totals() {
        let records = vec![
            checkout("1", 90_000, None, vec![line("a", "Bolu", 2)], at(2025, 3, 1)),
            checkout("2", 30_000, None, vec![line("a", "Bolu", 1), line("b", "Pie", 3)], at(2025, 3, 2)),
        ];
        let totals = IncomeTotals::from_records(&records);
        assert_eq!(totals.count, 2);
        assert_eq!(totals.total.rupiah(), 120_000);
        assert_eq!(totals.quantity, 6);
    }

    #[test]
    fn test_financial_summary_for_month() {
        let checkouts = vec![
            checkout("1", 90_000, None, vec![], at(2025, 3, 1)),
            checkout("2", 150_000, None, vec![], at(2025, 3, 2)),
            checkout("3", 150_000, None, vec![], at(2025, 3, 3)),
            checkout("4", 500_000, None, vec![], at(2025, 4, 1)),
        ];
        let expenses = vec![
            expense("a", 400_000, at(2025, 3, 10)),
            expense("b", 20_000, at(2025, 2, 10)),
        ];

        let period = MonthYear::new(Some(3), Some(2025)).unwrap();
        let summary = financial_summary(&checkouts, &expenses, period, Utc.fix(), 5);

        assert_eq!(summary.total_income.rupiah(), 390_000);
        assert_eq!(summary.total_expense.rupiah(), 400_000);
        assert_eq!(summary.net.rupiah(), -10_000);
        assert_eq!(summary.income_count, 3);
        assert_eq!(summary.highest_income.as_ref().map(|c| c.id.as_str()), Some("2"));
        assert_eq!(summary.highest_expense.as_ref().map(|e| e.id.as_str()), Some("a"));
    }

    #[test]
    fn test_financial_summary_preview_limit() {
        let checkouts: Vec<_> = (0..8)
            .map(|i| checkout(&i.to_string(), 1_000, None, vec![], at(2025, 1, 1)))
            .collect();
        let summary = financial_summary(&checkouts, &[], MonthYear::default(), Utc.fix(), 5);
        assert_eq!(summary.income_preview.len(), 5);
        assert_eq!(summary.income_preview[0].id, "0");
        assert!(summary.highest_expense.is_none());
    }

    #[test]
    fn test_gender_breakdown() {
        let records = vec![
            checkout("1", 0, Some(Gender::Male), vec![], at(2025, 1, 1)),
            checkout("2", 0, Some(Gender::Female), vec![], at(2025, 1, 1)),
            checkout("3", 0, Some(Gender::Female), vec![], at(2025, 1, 1)),
            checkout("4", 0, None, vec![], at(2025, 1, 1)),
        ];
        let g = GenderBreakdown::from_checkouts(&records);
        assert_eq!((g.male, g.female, g.unspecified), (1, 2, 1));
    }

    #[test]
    fn test_leaderboard_ties_keep_first_seen() {
        let records = vec![
            checkout("1", 0, None, vec![line("a", "Bolu", 2), line("b", "Pie", 3)], at(2025, 1, 1)),
            checkout("2", 0, None, vec![line("c", "Brownies", 3), line("a", "Bolu", 1)], at(2025, 1, 2)),
            checkout("3", 0, None, vec![line("d", "Klappertart", 1)], at(2025, 1, 3)),
        ];
        let board = product_leaderboard(&records, 2);
        let names: Vec<_> = board.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bolu", "Pie"]);

        let sales = sales_by_product(&records);
        assert_eq!(sales.get("a"), Some(&3));
        assert_eq!(sales.get("z"), None);
    }

    #[test]
    fn test_low_stock_and_recent() {
        let product = |id: &str, stock: i64, day: u32| Product {
            id: id.to_string(),
            code: String::new(),
            name: id.to_string(),
            description: String::new(),
            category: String::new(),
            unit_price: Money::zero(),
            cost_price: Money::zero(),
            stock,
            image: None,
            created_at: Some(at(2025, 1, day)),
        };
        let material = RawMaterial {
            id: "m1".to_string(),
            name: "Tepung".to_string(),
            quantity: 2,
            unit: "kg".to_string(),
            entry_kind: String::new(),
            note: String::new(),
            date: None,
            created_at: None,
        };
        let products = vec![product("p1", 9, 3), product("p2", 10, 5), product("p3", 0, 4)];

        let notices = low_stock_notices(&products, std::slice::from_ref(&material), 10);
        let ids: Vec<_> = notices.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3", "m1"]);

        let recent = recently_added(&products, &[material], 3);
        let ids: Vec<_> = recent.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["p2", "p3", "p1"]);
    }

    #[test]
    fn test_attendance_recap() {
        let mark = |emp: &str, status: &str, day: u32, month: u32| AttendanceRecord {
            id: String::new(),
            employee_id: emp.to_string(),
            employee_name: format!("Pegawai {emp}"),
            status: status.to_string(),
            note: String::new(),
            created_at: at(2025, month, day),
        };
        let records = vec![
            mark("b", "Hadir", 1, 6),
            mark("a", "hadir", 1, 6),
            mark("b", "SAKIT", 2, 6),
            mark("a", "alpa", 2, 6),
            mark("a", "cuti", 3, 6),
            mark("c", "cuti", 3, 6),
            mark("a", "hadir", 1, 7),
        ];

        let recap = attendance_recap(&records, 6, 2025, Utc.fix());
        assert_eq!(recap.len(), 2);
        assert_eq!(recap[0].employee_id, "b");
        assert_eq!((recap[0].present, recap[0].sick), (1, 1));
        assert_eq!((recap[1].present, recap[1].absent), (1, 1));
        assert_eq!(recap[1].total(), 2);
    }

    #[test]
    fn test_month_edges_follow_store_timezone() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        // 1 July 05:00 WIB
        let early = Utc.with_ymd_and_hms(2025, 6, 30, 22, 0, 0).unwrap();
        let records = vec![AttendanceRecord {
            id: String::new(),
            employee_id: "a".to_string(),
            employee_name: "Sinta".to_string(),
            status: "hadir".to_string(),
            note: String::new(),
            created_at: early,
        }];

        assert_eq!(attendance_recap(&records, 7, 2025, wib).len(), 1);
        assert!(attendance_recap(&records, 6, 2025, wib).is_empty());
        assert_eq!(attendance_recap(&records, 6, 2025, Utc.fix()).len(), 1);

        let checkouts = vec![checkout("1", 50_000, None, vec![], early)];
        let july = MonthYear::new(Some(7), Some(2025)).unwrap();
        let summary = financial_summary(&checkouts, &[], july, wib, 5);
        assert_eq!(summary.total_income.rupiah(), 50_000);
    }
}
