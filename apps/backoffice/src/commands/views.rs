//! # Page Loaders
//!
//! One loader per back-office page. Each fetches what the page needs from
//! the backend and hands it to the pure functions in `labodine_core`.
//!
//! ```text
//!   page                 loader                     core function
//!   ─────────────────    ───────────────────────    ──────────────────────
//!   Produk               load_product_page          product_page
//!   Kasir                load_cashier_catalog       catalog_view
//!   Bahan Baku           load_raw_material_page     raw_material_page
//!   Daftar Pemasukan     load_income_page           filter_records + totals
//!   Daftar Pengeluaran   load_expense_page          filter_records + total
//!   Laporan Keuangan     load_financial_report      financial_summary
//!   Dashboard            load_dashboard             dashboard_summary
//!   Rekap Absen          load_attendance_recap      attendance_recap
//!   Pelanggan            load_customers             (search only)
//! ```

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use labodine_core::listing::{
    catalog_view, contains_ignore_case, filter_records, product_page, raw_material_page,
    CatalogEntry, CatalogQuery, DashboardCheckoutQuery, ExpenseQuery, IncomeQuery, MonthYear,
    Page, ProductQuery, RawMaterialQuery,
};
use labodine_core::reports::{
    attendance_recap, dashboard_summary, expense_total, financial_summary, sales_by_product,
    AttendanceRecap, DashboardSummary, FinancialSummary, IncomeTotals,
};
use labodine_core::{CheckoutRecord, Customer, ExpenseEntry, Money, Product, RawMaterial, Session, View};

use crate::error::ApiError;
use crate::gateway::{CatalogSource, LedgerSource};
use crate::state::ConfigState;

// =============================================================================
// View Models
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageView {
    pub page: Page<Product>,
    /// Products under the low-stock threshold, across the whole catalog.
    pub low_stock: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialPageView {
    pub page: Page<RawMaterial>,
    pub low_stock: usize,
    /// Distinct jenisPemasukan values for the filter drop-down.
    pub entry_kinds: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomePageView {
    pub page: Page<CheckoutRecord>,
    /// Totals over every filtered record, not just this page.
    pub totals: IncomeTotals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePageView {
    pub page: Page<ExpenseEntry>,
    /// Sum over every filtered entry.
    pub total: Money,
    pub kinds: Vec<String>,
}

// =============================================================================
// Catalog Pages
// =============================================================================

pub async fn load_product_page<C: CatalogSource>(
    catalog: &C,
    config: &ConfigState,
    session: &Session,
    query: ProductQuery,
) -> Result<ProductPageView, ApiError> {
    debug!(search = %query.search, page = query.page, "load_product_page command");
    session.require(View::Products)?;

    let products = catalog.list_products().await?;
    let threshold = config.stock.low_stock_threshold;
    let low_stock = products.iter().filter(|p| p.is_low_stock(threshold)).count();

    Ok(ProductPageView {
        page: product_page(&products, &query, config.pages.product_page_size),
        low_stock,
    })
}

/// Product cards for the cashier, with units sold from the checkout ledger.
pub async fn load_cashier_catalog<B>(
    backend: &B,
    session: &Session,
    query: CatalogQuery,
) -> Result<Vec<CatalogEntry>, ApiError>
where
    B: CatalogSource + LedgerSource,
{
    debug!(search = %query.search, sort = ?query.sort, "load_cashier_catalog command");
    session.require(View::Cashier)?;

    let products = backend.list_products().await?;
    let checkouts = backend.list_checkouts().await?;
    Ok(catalog_view(&products, &query, &sales_by_product(&checkouts)))
}

pub async fn load_raw_material_page<C: CatalogSource>(
    catalog: &C,
    config: &ConfigState,
    session: &Session,
    mut query: RawMaterialQuery,
) -> Result<RawMaterialPageView, ApiError> {
    debug!(search = %query.search, page = query.page, "load_raw_material_page command");
    session.require(View::RawMaterials)?;

    if query.low_threshold == 0 {
        query.low_threshold = config.stock.raw_material_low_level;
    }
    query.utc_offset = Some(config.utc_offset());

    let materials = catalog.list_raw_materials().await?;
    let low_stock = materials
        .iter()
        .filter(|m| m.quantity <= query.low_threshold)
        .count();

    Ok(RawMaterialPageView {
        page: raw_material_page(&materials, &query, config.pages.raw_material_page_size),
        low_stock,
        entry_kinds: distinct(materials.iter().map(|m| m.entry_kind.as_str())),
    })
}

// =============================================================================
// Ledger Pages
// =============================================================================

pub async fn load_income_page<L: LedgerSource>(
    ledger: &L,
    config: &ConfigState,
    session: &Session,
    mut query: IncomeQuery,
) -> Result<IncomePageView, ApiError> {
    debug!(period = ?query.period, page = query.page, "load_income_page command");
    session.require(View::Income)?;
    query.utc_offset = Some(config.utc_offset());

    let rows = filter_records(&ledger.list_checkouts().await?, &query);
    let totals = IncomeTotals::from_records(&rows);

    Ok(IncomePageView {
        page: Page::paginate(rows, query.page, config.pages.ledger_page_size),
        totals,
    })
}

pub async fn load_expense_page<L: LedgerSource>(
    ledger: &L,
    config: &ConfigState,
    session: &Session,
    mut query: ExpenseQuery,
) -> Result<ExpensePageView, ApiError> {
    debug!(search = %query.search, page = query.page, "load_expense_page command");
    session.require(View::Expenses)?;
    query.utc_offset = Some(config.utc_offset());

    let entries = ledger.list_expenses().await?;
    let kinds = distinct(entries.iter().map(|e| e.kind.as_str()));
    let rows = filter_records(&entries, &query);
    let total = expense_total(&rows);

    Ok(ExpensePageView {
        page: Page::paginate(rows, query.page, config.pages.ledger_page_size),
        total,
        kinds,
    })
}

// =============================================================================
// Reports
// =============================================================================

pub async fn load_financial_report<L: LedgerSource>(
    ledger: &L,
    config: &ConfigState,
    session: &Session,
    period: MonthYear,
) -> Result<FinancialSummary, ApiError> {
    debug!(?period, "load_financial_report command");
    session.require(View::FinancialReport)?;

    let checkouts = ledger.list_checkouts().await?;
    let expenses = ledger.list_expenses().await?;
    let summary = financial_summary(
        &checkouts,
        &expenses,
        period,
        config.utc_offset(),
        config.pages.report_preview_len,
    );

    info!(
        income = %summary.total_income,
        expense = %summary.total_expense,
        "Financial report built"
    );
    Ok(summary)
}

pub async fn load_dashboard<B>(
    backend: &B,
    config: &ConfigState,
    session: &Session,
    mut query: DashboardCheckoutQuery,
) -> Result<DashboardSummary, ApiError>
where
    B: CatalogSource + LedgerSource,
{
    debug!(product = %query.product, "load_dashboard command");
    session.require(View::Dashboard)?;
    query.utc_offset = Some(config.utc_offset());

    let products = backend.list_products().await?;
    let materials = backend.list_raw_materials().await?;
    let checkouts = filter_records(&backend.list_checkouts().await?, &query);

    Ok(dashboard_summary(
        &products,
        &materials,
        &checkouts,
        config.dashboard_options(),
    ))
}

/// Recap for one month. Missing parts default to the current month in the
/// store's timezone.
pub async fn load_attendance_recap<L: LedgerSource>(
    ledger: &L,
    config: &ConfigState,
    session: &Session,
    month: Option<u32>,
    year: Option<i32>,
) -> Result<Vec<AttendanceRecap>, ApiError> {
    debug!(?month, ?year, "load_attendance_recap command");
    session.require(View::Attendance)?;

    let offset = config.utc_offset();
    let today = Utc::now().with_timezone(&offset);
    let month = month.unwrap_or_else(|| today.month());
    let year = year.unwrap_or_else(|| today.year());
    MonthYear::new(Some(month), Some(year))?;

    let records = ledger.list_attendance().await?;
    Ok(attendance_recap(&records, month, year, offset))
}

/// Customers whose number contains `search`.
pub async fn load_customers<L: LedgerSource>(
    ledger: &L,
    session: &Session,
    search: &str,
) -> Result<Vec<Customer>, ApiError> {
    debug!(search, "load_customers command");
    session.require(View::Members)?;

    let search = search.trim();
    Ok(ledger
        .list_customers()
        .await?
        .into_iter()
        .filter(|c| contains_ignore_case(&c.customer_number, search))
        .collect())
}

/// Non-empty values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values.map(str::trim).filter(|v| !v.is_empty()) {
        if !out.iter().any(|seen| seen == value) {
            out.push(value.to_string());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::gateway::{MemoryBackend, Snapshot};
    use labodine_core::listing::CatalogSort;
    use labodine_core::{PaymentMethod, Role};

    fn backend() -> MemoryBackend {
        MemoryBackend::new(
            Snapshot::from_json(
                r#"{
                "products": [
                    {"_id": "p-1", "namaProduk": "Klappertart", "harga": 50000, "jumlah": 3},
                    {"_id": "p-2", "namaProduk": "Brownies", "harga": 35000, "jumlah": 20},
                    {"_id": "p-3", "namaProduk": "Bolu Pandan", "harga": 40000, "jumlah": 12}
                ],
                "rawMaterials": [
                    {"_id": "b-1", "namaBarang": "Tepung", "jumlah": 10, "satuan": "kg", "jenisPemasukan": "Pembelian"},
                    {"_id": "b-2", "namaBarang": "Telur", "jumlah": 2, "satuan": "kg", "jenisPemasukan": "Hibah"},
                    {"_id": "b-3", "namaBarang": "Gula", "jumlah": 4, "satuan": "kg", "jenisPemasukan": "Pembelian"}
                ],
                "checkouts": [
                    {"_id": "c-1", "paymentMethod": "tunai", "subtotal": 100000, "total": 100000,
                     "cartItems": [{"_id": "p-1", "namaProduk": "Klappertart", "harga": 50000, "quantity": 2}],
                     "customerGender": "Wanita", "createdAt": "2025-03-03T07:00:00Z"},
                    {"_id": "c-2", "paymentMethod": "qris", "subtotal": 105000, "total": 105000,
                     "cartItems": [{"_id": "p-2", "namaProduk": "Brownies", "harga": 35000, "quantity": 3}],
                     "createdAt": "2025-04-10T07:00:00Z"}
                ],
                "expenses": [
                    {"_id": "e-1", "namaPengeluaran": "Listrik", "jumlah": "40000", "jenisPengeluaran": "Operasional", "tanggal": "2025-03-05T00:00:00Z"},
                    {"_id": "e-2", "namaPengeluaran": "Gas", "jumlah": 25000, "jenisPengeluaran": "Bahan", "tanggal": "2025-03-20T00:00:00Z"}
                ],
                "attendance": [
                    {"employeeId": "u-1", "employeeName": "Sinta", "status": "hadir", "createdAt": "2025-03-01T02:00:00Z"},
                    {"employeeId": "u-1", "employeeName": "Sinta", "status": "Sakit", "createdAt": "2025-03-02T02:00:00Z"},
                    {"employeeId": "u-2", "employeeName": "Budi", "status": "cuti", "createdAt": "2025-03-02T02:00:00Z"}
                ],
                "customers": [
                    {"_id": "k-1", "customerNumber": "081234567890", "totalTransaksi": 100000},
                    {"_id": "k-2", "customerNumber": "085700001111", "totalTransaksi": 0}
                ]
            }"#,
            )
            .unwrap(),
        )
    }

    fn session() -> Session {
        Session::new("t", "sinta", Role::Pegawai).unwrap()
    }

    fn config() -> ConfigState {
        let mut config = ConfigState::default();
        config.pages.product_page_size = 2;
        config.pages.ledger_page_size = 1;
        config
    }

    #[tokio::test]
    async fn test_product_page() {
        let view = load_product_page(&backend(), &config(), &session(), ProductQuery::default())
            .await
            .unwrap();
        assert_eq!(view.page.items.len(), 2);
        assert_eq!(view.page.total_pages, 2);
        assert_eq!(view.low_stock, 1);
    }

    #[tokio::test]
    async fn test_cashier_catalog_best_seller() {
        let query = CatalogQuery {
            sort: Some(CatalogSort::BestSeller),
            ..Default::default()
        };
        let entries = load_cashier_catalog(&backend(), &session(), query).await.unwrap();
        assert_eq!(entries[0].product.id, "p-2");
        assert_eq!(entries[0].sold, 3);
        assert_eq!(entries[2].sold, 0);
    }

    #[tokio::test]
    async fn test_raw_material_page_uses_configured_threshold() {
        let mut config = config();
        config.stock.raw_material_low_level = 3;
        let view = load_raw_material_page(&backend(), &config, &session(), RawMaterialQuery::default())
            .await
            .unwrap();
        assert_eq!(view.low_stock, 1);
        assert_eq!(view.entry_kinds, vec!["Pembelian", "Hibah"]);
        assert_eq!(view.page.total_items, 3);
    }

    #[tokio::test]
    async fn test_income_totals_cover_all_pages() {
        let view = load_income_page(&backend(), &config(), &session(), IncomeQuery::default())
            .await
            .unwrap();
        assert_eq!(view.page.items.len(), 1);
        assert_eq!(view.totals.count, 2);
        assert_eq!(view.totals.quantity, 5);
        assert_eq!(view.totals.total, Money::from_rupiah(205_000));
    }

    #[tokio::test]
    async fn test_expense_page_filters_by_kind() {
        let query = ExpenseQuery {
            kind: Some("Operasional".to_string()),
            ..Default::default()
        };
        let view = load_expense_page(&backend(), &config(), &session(), query).await.unwrap();
        assert_eq!(view.total, Money::from_rupiah(40_000));
        assert_eq!(view.kinds, vec!["Operasional", "Bahan"]);
    }

    #[tokio::test]
    async fn test_financial_report_for_month() {
        let period = MonthYear::new(Some(3), Some(2025)).unwrap();
        let report = load_financial_report(&backend(), &config(), &session(), period)
            .await
            .unwrap();
        assert_eq!(report.total_income, Money::from_rupiah(100_000));
        assert_eq!(report.total_expense, Money::from_rupiah(65_000));
        assert_eq!(report.net, Money::from_rupiah(35_000));
    }

    #[tokio::test]
    async fn test_dashboard_filtered_by_payment() {
        let query = DashboardCheckoutQuery {
            payment_method: Some(PaymentMethod::Qris),
            ..Default::default()
        };
        let summary = load_dashboard(&backend(), &config(), &session(), query).await.unwrap();
        assert_eq!(summary.checkout_count, 1);
        assert_eq!(summary.total_products, 3);
        assert_eq!(summary.total_income, Money::from_rupiah(105_000));
    }

    #[tokio::test]
    async fn test_attendance_recap() {
        let recap = load_attendance_recap(&backend(), &config(), &session(), Some(3), Some(2025))
            .await
            .unwrap();
        assert_eq!(recap.len(), 1);
        assert_eq!(recap[0].present, 1);
        assert_eq!(recap[0].sick, 1);

        let err = load_attendance_recap(&backend(), &config(), &session(), Some(13), Some(2025))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_ledger_pages_bucket_in_store_time() {
        // 1 April 03:00 WIB
        let backend = MemoryBackend::new(
            Snapshot::from_json(
                r#"{
                "checkouts": [
                    {"_id": "c-9", "paymentMethod": "qris", "subtotal": 70000, "total": 70000,
                     "cartItems": [{"_id": "p-2", "namaProduk": "Brownies", "harga": 35000, "quantity": 2}],
                     "createdAt": "2025-03-31T20:00:00Z"}
                ],
                "attendance": [
                    {"employeeId": "u-1", "employeeName": "Sinta", "status": "hadir", "createdAt": "2025-03-31T20:00:00Z"}
                ]
            }"#,
            )
            .unwrap(),
        );
        let april = MonthYear::new(Some(4), Some(2025)).unwrap();

        let query = IncomeQuery {
            period: april,
            ..Default::default()
        };
        let view = load_income_page(&backend, &config(), &session(), query).await.unwrap();
        assert_eq!(view.totals.count, 1);

        let report = load_financial_report(&backend, &config(), &session(), april)
            .await
            .unwrap();
        assert_eq!(report.total_income, Money::from_rupiah(70_000));

        let recap = load_attendance_recap(&backend, &config(), &session(), Some(4), Some(2025))
            .await
            .unwrap();
        assert_eq!(recap.len(), 1);
    }

    #[tokio::test]
    async fn test_customer_search() {
        let found = load_customers(&backend(), &session(), " 0857 ").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "k-2");

        let all = load_customers(&backend(), &session(), "").await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_offline_backend_is_gateway_error() {
        let err = load_product_page(
            &backend().offline(),
            &config(),
            &session(),
            ProductQuery::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::GatewayError);
    }
}
