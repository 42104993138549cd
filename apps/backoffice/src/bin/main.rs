//! # Labodine Back-Office CLI
//!
//! Runs the page loaders against a JSON snapshot of the backend and prints
//! the result as JSON. Handy for checking report numbers offline.
//!
//! ```text
//! labodine-backoffice --snapshot dump.json report --month 2025-03
//! labodine-backoffice --snapshot dump.json income --payment transfer --page 2
//! labodine-backoffice --snapshot dump.json catalog --sort best-seller
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use labodine_backoffice::commands::views;
use labodine_backoffice::gateway::{MemoryBackend, Snapshot};
use labodine_backoffice::init_tracing;
use labodine_backoffice::state::ConfigState;
use labodine_core::listing::{
    CatalogQuery, CatalogSort, DashboardCheckoutQuery, ExpenseQuery, IncomeQuery, MonthYear,
    ProductQuery, RawMaterialQuery, SortDirection,
};
use labodine_core::{Role, Session};

#[derive(Debug, Parser)]
#[command(name = "labodine-backoffice", about = "Labodine back-office reports", long_about = None)]
struct Cli {
    /// Backend snapshot (JSON with products, rawMaterials, checkouts, ...)
    #[arg(long)]
    snapshot: PathBuf,

    /// Config file; defaults to the platform config dir
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Laporan keuangan
    Report(PeriodArgs),
    Dashboard(DashboardArgs),
    /// Daftar pemasukan
    Income(IncomeArgs),
    /// Daftar pengeluaran
    Expenses(ExpenseArgs),
    Products(ProductArgs),
    /// Bahan baku
    Materials(MaterialArgs),
    /// Rekap absen
    Attendance(AttendanceArgs),
    /// Cashier product cards
    Catalog(CatalogArgs),
    Customers(CustomerArgs),
}

#[derive(Debug, Args)]
struct PeriodArgs {
    /// Month as YYYY-MM
    #[arg(long)]
    month: Option<String>,

    /// Year alone, when no month is given
    #[arg(long)]
    year: Option<i32>,
}

impl PeriodArgs {
    fn period(&self) -> Result<MonthYear, Box<dyn std::error::Error>> {
        Ok(match &self.month {
            Some(month) => MonthYear::parse_year_month(month)?,
            None => MonthYear::new(None, self.year)?,
        })
    }
}

#[derive(Debug, Args)]
struct DashboardArgs {
    #[command(flatten)]
    period: PeriodArgs,

    /// Product name filter
    #[arg(long, default_value = "")]
    product: String,
}

#[derive(Debug, Args)]
struct IncomeArgs {
    #[command(flatten)]
    period: PeriodArgs,

    /// Payment tag substring ("transfer" matches every bank)
    #[arg(long, default_value = "")]
    payment: String,

    #[arg(long, default_value = "")]
    product: String,

    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Debug, Args)]
struct ExpenseArgs {
    #[command(flatten)]
    period: PeriodArgs,

    #[arg(long, default_value = "")]
    search: String,

    /// jenisPengeluaran
    #[arg(long)]
    kind: Option<String>,

    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Debug, Args)]
struct ProductArgs {
    #[arg(long, default_value = "")]
    search: String,

    #[arg(long)]
    category: Option<String>,

    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Debug, Args)]
struct MaterialArgs {
    #[arg(long, default_value = "")]
    search: String,

    /// Largest quantity first
    #[arg(long)]
    largest_first: bool,

    #[arg(long, default_value_t = 1)]
    page: usize,
}

#[derive(Debug, Args)]
struct AttendanceArgs {
    /// 1..=12; defaults to the current month
    #[arg(long)]
    month: Option<u32>,

    #[arg(long)]
    year: Option<i32>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    BestSeller,
    PriceLowHigh,
    PriceHighLow,
    StockHigh,
}

impl From<SortArg> for CatalogSort {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::BestSeller => CatalogSort::BestSeller,
            SortArg::PriceLowHigh => CatalogSort::PriceLowHigh,
            SortArg::PriceHighLow => CatalogSort::PriceHighLow,
            SortArg::StockHigh => CatalogSort::StockHigh,
        }
    }
}

#[derive(Debug, Args)]
struct CatalogArgs {
    #[arg(long, default_value = "")]
    search: String,

    #[arg(long)]
    category: Option<String>,

    #[arg(long, value_enum)]
    sort: Option<SortArg>,
}

#[derive(Debug, Args)]
struct CustomerArgs {
    /// Phone number fragment
    #[arg(long, default_value = "")]
    search: String,
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    let config = ConfigState::load(cli.config)?;
    let backend = MemoryBackend::new(Snapshot::load(&cli.snapshot)?);
    let session = Session::new("local", config.store.cashier_fallback.clone(), Role::Admin)?;
    info!(snapshot = ?cli.snapshot, store = %config.store.name, "Snapshot loaded");

    match cli.command {
        Commands::Report(args) => {
            let report =
                views::load_financial_report(&backend, &config, &session, args.period()?).await?;
            print_json(&report)
        }
        Commands::Dashboard(args) => {
            let query = DashboardCheckoutQuery {
                product: args.product,
                period: args.period.period()?,
                ..Default::default()
            };
            print_json(&views::load_dashboard(&backend, &config, &session, query).await?)
        }
        Commands::Income(args) => {
            let query = IncomeQuery {
                period: args.period.period()?,
                payment_method: args.payment,
                product: args.product,
                page: args.page,
                ..Default::default()
            };
            print_json(&views::load_income_page(&backend, &config, &session, query).await?)
        }
        Commands::Expenses(args) => {
            let query = ExpenseQuery {
                search: args.search,
                kind: args.kind,
                period: args.period.period()?,
                page: args.page,
                ..Default::default()
            };
            print_json(&views::load_expense_page(&backend, &config, &session, query).await?)
        }
        Commands::Products(args) => {
            let query = ProductQuery {
                search: args.search,
                category: args.category,
                page: args.page,
            };
            print_json(&views::load_product_page(&backend, &config, &session, query).await?)
        }
        Commands::Materials(args) => {
            let query = RawMaterialQuery {
                search: args.search,
                sort: args.largest_first.then_some(SortDirection::Descending),
                page: args.page,
                ..Default::default()
            };
            print_json(&views::load_raw_material_page(&backend, &config, &session, query).await?)
        }
        Commands::Attendance(args) => {
            let recap =
                views::load_attendance_recap(&backend, &config, &session, args.month, args.year)
                    .await?;
            print_json(&recap)
        }
        Commands::Catalog(args) => {
            let query = CatalogQuery {
                search: args.search,
                category: args.category,
                sort: args.sort.map(CatalogSort::from),
                ..Default::default()
            };
            print_json(&views::load_cashier_catalog(&backend, &session, query).await?)
        }
        Commands::Customers(args) => {
            print_json(&views::load_customers(&backend, &session, &args.search).await?)
        }
    }
}
