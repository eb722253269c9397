use axum::{
    extract::{Multipart, Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use models::{OperationType, PivotResponse, SummaryEntry, TypeStatusCount, ViewType};
use pivot_engine::{pivot, summarize, Dataset};

use crate::{error::ApiError, store::DatasetStore, Result};

pub type StoreState = Arc<DatasetStore>;

/// Query parameters of the pivot endpoint. `view_type` defaults to the
/// acquirer view; range validation happens in the handler so the
/// rejection names the offending field.
#[derive(Debug, Deserialize)]
pub struct PivotParams {
    pub operation_type: i64,
    pub view_type: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub loaded: bool,
    pub filename: Option<String>,
    pub row_count: usize,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub total_rows: usize,
    pub type_status_breakdown: Vec<TypeStatusCount>,
}

#[derive(Debug, Serialize)]
pub struct SummariesResponse {
    pub summaries: Vec<SummaryEntry>,
}

#[derive(Debug, Serialize)]
pub struct CurrenciesResponse {
    pub currencies: Vec<String>,
}

/// GET /
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Transaction Pivot API"
    }))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "transaction-pivot-api"
    }))
}

/// GET /api/status
/// Whether a dataset is loaded, and which one
pub async fn get_status(State(store): State<StoreState>) -> Json<StatusResponse> {
    match store.snapshot().await {
        Some(dataset) => Json(StatusResponse {
            loaded: true,
            filename: Some(dataset.filename().to_owned()),
            row_count: dataset.len(),
        }),
        None => Json(StatusResponse {
            loaded: false,
            filename: None,
            row_count: 0,
        }),
    }
}

/// POST /api/upload
/// Parse an uploaded xlsx report and atomically replace the active
/// dataset. On any failure the previously loaded dataset stays live.
pub async fn upload_report(
    State(store): State<StoreState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("report.xlsx").to_owned();
        if !filename.to_lowercase().ends_with(".xlsx") {
            tracing::debug!(%filename, "rejected upload with unsupported extension");
            return Err(ApiError::UnsupportedFileType(filename));
        }

        let bytes = field.bytes().await?;
        let records = report_parser::parse_bytes(&bytes)?;
        let dataset = store.replace(Dataset::new(filename.clone(), records)).await;
        tracing::info!(rows = dataset.len(), %filename, "dataset replaced");

        return Ok(Json(UploadResponse {
            success: true,
            filename,
            total_rows: dataset.len(),
            type_status_breakdown: dataset.type_status_breakdown(),
        }));
    }

    Err(ApiError::MissingFile)
}

/// GET /api/pivot?operation_type=&view_type=&currency=
/// The three-level pivot for one operation type, grouped by acquirer or
/// by merchant, optionally restricted to a single currency.
pub async fn get_pivot(
    State(store): State<StoreState>,
    Query(params): Query<PivotParams>,
) -> Result<Json<PivotResponse>> {
    let op = OperationType::from_code(params.operation_type).ok_or_else(|| {
        ApiError::InvalidParameter {
            name: "operation_type",
            value: params.operation_type.to_string(),
        }
    })?;
    let view_code = params.view_type.unwrap_or(1);
    let view = ViewType::from_code(view_code).ok_or_else(|| ApiError::InvalidParameter {
        name: "view_type",
        value: view_code.to_string(),
    })?;
    // Currency filter is matched against the report's uppercase codes;
    // a filter no currency matches yields an empty result, not an error.
    let currency = params
        .currency
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty());

    let dataset = store.snapshot().await.ok_or(ApiError::NoDataLoaded)?;
    let data = pivot(&dataset, op, view, currency.as_deref());

    Ok(Json(PivotResponse {
        operation_type: op.code(),
        view_type: view.code(),
        currency_filter: currency,
        data: data.rounded(),
    }))
}

/// GET /api/summary
/// Flat totals per operation type over the whole dataset
pub async fn get_summary(State(store): State<StoreState>) -> Result<Json<SummariesResponse>> {
    let dataset = store.snapshot().await.ok_or(ApiError::NoDataLoaded)?;
    let summaries = summarize(&dataset)
        .into_iter()
        .map(SummaryEntry::rounded)
        .collect();
    Ok(Json(SummariesResponse { summaries }))
}

/// GET /api/currencies
/// Distinct currency codes present in the dataset, for filter choices
pub async fn get_currencies(State(store): State<StoreState>) -> Result<Json<CurrenciesResponse>> {
    let dataset = store.snapshot().await.ok_or(ApiError::NoDataLoaded)?;
    Ok(Json(CurrenciesResponse {
        currencies: dataset.distinct_currencies(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::TransactionRecord;
    use rust_decimal_macros::dec;

    fn record(
        acquirer: &str,
        legal_name: &str,
        currency: &str,
        kind: &str,
        status: &str,
    ) -> TransactionRecord {
        TransactionRecord {
            legal_name: legal_name.into(),
            brand_name: String::new(),
            acquirer: acquirer.into(),
            currency: currency.into(),
            amount: dec!(100.00),
            fee: dec!(2.00),
            psp_buy_fee: dec!(1.00),
            kind: kind.into(),
            status: status.into(),
        }
    }

    async fn loaded_store() -> StoreState {
        let store = Arc::new(DatasetStore::new());
        store
            .replace(Dataset::new(
                "report.xlsx",
                vec![
                    record("AcquirerA", "MerchantX", "USD", "purchase", "paid"),
                    record("AcquirerA", "MerchantY", "EUR", "purchase", "paid"),
                    record("AcquirerB", "MerchantX", "USD", "refund", "success"),
                ],
            ))
            .await;
        store
    }

    fn pivot_params(operation_type: i64, view_type: Option<i64>) -> Query<PivotParams> {
        Query(PivotParams {
            operation_type,
            view_type,
            currency: None,
        })
    }

    #[tokio::test]
    async fn test_pivot_rejects_unknown_operation_type() {
        let store = loaded_store().await;
        let err = get_pivot(State(store), pivot_params(7, None))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidParameter {
                name: "operation_type",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_pivot_rejects_unknown_view_type() {
        let store = loaded_store().await;
        let err = get_pivot(State(store), pivot_params(1, Some(3)))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidParameter {
                name: "view_type",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_pivot_requires_loaded_dataset() {
        let store = Arc::new(DatasetStore::new());
        let err = get_pivot(State(store), pivot_params(1, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NoDataLoaded));
    }

    #[tokio::test]
    async fn test_pivot_defaults_to_acquirer_view() {
        let store = loaded_store().await;
        let Json(body) = get_pivot(State(store), pivot_params(1, None)).await.unwrap();

        assert_eq!(body.operation_type, 1);
        assert_eq!(body.view_type, 1);
        assert_eq!(body.currency_filter, None);
        assert_eq!(body.data.totals.count, 2);
        assert_eq!(body.data.totals.amount, dec!(200.00));
        assert_eq!(body.data.groups.len(), 1);
        assert_eq!(body.data.groups[0].key, "AcquirerA");
    }

    #[tokio::test]
    async fn test_pivot_uppercases_currency_filter() {
        let store = loaded_store().await;
        let Json(body) = get_pivot(
            State(store),
            Query(PivotParams {
                operation_type: 1,
                view_type: Some(2),
                currency: Some("usd".into()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(body.currency_filter.as_deref(), Some("USD"));
        assert_eq!(body.view_type, 2);
        assert_eq!(body.data.totals.count, 1);
        assert_eq!(body.data.groups[0].key, "MerchantX");
    }

    #[tokio::test]
    async fn test_summary_and_currencies() {
        let store = loaded_store().await;

        let Json(summary) = get_summary(State(Arc::clone(&store))).await.unwrap();
        let codes: Vec<u8> = summary.summaries.iter().map(|s| s.operation_type).collect();
        assert_eq!(codes, vec![1, 2]);
        assert_eq!(summary.summaries[0].count, 2);

        let Json(currencies) = get_currencies(State(store)).await.unwrap();
        assert_eq!(currencies.currencies, vec!["EUR", "USD"]);
    }

    #[tokio::test]
    async fn test_status_reflects_loaded_dataset() {
        let store = Arc::new(DatasetStore::new());
        let Json(body) = get_status(State(Arc::clone(&store))).await;
        assert!(!body.loaded);
        assert_eq!(body.row_count, 0);

        store
            .replace(Dataset::new("report.xlsx", vec![record("A", "M", "EUR", "payout", "success")]))
            .await;
        let Json(body) = get_status(State(store)).await;
        assert!(body.loaded);
        assert_eq!(body.filename.as_deref(), Some("report.xlsx"));
        assert_eq!(body.row_count, 1);
    }
}
