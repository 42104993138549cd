//! # Raw-Material Stock-Out
//!
//! Barang keluar: taking raw materials out of storage for production,
//! spoilage and the like.

use tracing::{debug, info};

use labodine_core::validation::validate_stock_out;
use labodine_core::{Session, ValidationError, View};

use crate::error::ApiError;
use crate::gateway::{CatalogSource, RawMaterialStockOut, StockSink};

/// Checks the form against current stock, then records the stock-out.
/// Returns the quantity left.
pub async fn take_raw_material<B>(
    backend: &B,
    session: &Session,
    form: RawMaterialStockOut,
) -> Result<i64, ApiError>
where
    B: CatalogSource + StockSink,
{
    debug!(name = %form.name, quantity = form.quantity, "take_raw_material command");
    session.require(View::RawMaterials)?;

    if form.kind.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "jenisPengeluaran".to_string(),
        }
        .into());
    }

    let available = backend
        .list_raw_materials()
        .await?
        .into_iter()
        .find(|m| m.name == form.name)
        .map(|m| m.quantity)
        .ok_or_else(|| ApiError::not_found("Raw material", &form.name))?;

    validate_stock_out(form.quantity, available)?;

    let left = backend.take_raw_material(&form).await?;
    info!(name = %form.name, quantity = form.quantity, left, "Raw material taken out");
    Ok(left)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::gateway::{MemoryBackend, Snapshot};
    use labodine_core::Role;

    fn backend() -> MemoryBackend {
        MemoryBackend::new(
            Snapshot::from_json(
                r#"{"rawMaterials": [
                    {"_id": "b-1", "namaBarang": "Tepung", "jumlah": 10, "satuan": "kg"}
                ]}"#,
            )
            .unwrap(),
        )
    }

    fn form(quantity: i64, kind: &str) -> RawMaterialStockOut {
        RawMaterialStockOut {
            name: "Tepung".to_string(),
            quantity,
            unit: "kg".to_string(),
            kind: kind.to_string(),
            date: None,
            note: String::new(),
        }
    }

    fn session() -> Session {
        Session::new("t", "budi", Role::Pegawai).unwrap()
    }

    #[tokio::test]
    async fn test_stock_out() {
        let left = take_raw_material(&backend(), &session(), form(4, "Produksi"))
            .await
            .unwrap();
        assert_eq!(left, 6);
    }

    #[tokio::test]
    async fn test_stock_out_over_stock() {
        let err = take_raw_material(&backend(), &session(), form(11, "Produksi"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_stock_out_requires_kind() {
        let err = take_raw_material(&backend(), &session(), form(1, " "))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_unknown_material() {
        let mut f = form(1, "Produksi");
        f.name = "Gula".to_string();
        let err = take_raw_material(&backend(), &session(), f).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
