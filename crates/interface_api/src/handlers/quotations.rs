//! Quotation handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::dto::billing::{
    ConvertQuotationRequest, CreateQuotationRequest, InvoiceResponse, LineItemRequest,
    QuotationResponse, SendQuotationResponse, UpdateItemsRequest,
};
use crate::{error::ApiError, AppState};
use core_kernel::{ClientId, Currency, QuotationId, TaxRate};
use domain_billing::{LineItem, QuotationStatus};
use infra_db::{ClientRepository, NewQuotation, QuotationRepository};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

pub(crate) fn build_items(requests: Vec<LineItemRequest>) -> Result<Vec<LineItem>, ApiError> {
    requests
        .into_iter()
        .map(|r| LineItem::new(r.description, r.quantity, r.unit_price).map_err(ApiError::from))
        .collect()
}

pub(crate) fn parse_currency(code: &str) -> Result<Currency, ApiError> {
    code.parse()
        .map_err(|_| ApiError::Validation(format!("Unknown currency: {code}")))
}

pub(crate) fn parse_tax_rate(rate: rust_decimal::Decimal) -> Result<TaxRate, ApiError> {
    TaxRate::from_percentage(rate).map_err(|e| ApiError::Validation(e.to_string()))
}

/// Creates a draft quotation, freezing the client's contact snapshot
pub async fn create_quotation(
    State(state): State<AppState>,
    Json(request): Json<CreateQuotationRequest>,
) -> Result<(StatusCode, Json<QuotationResponse>), ApiError> {
    let clients = ClientRepository::new(state.pool.clone());
    let client = clients.get_active(ClientId::from_uuid(request.client_id)).await?;
    let contact = client.contact_snapshot()?;

    let new = NewQuotation {
        client_ref: client.id,
        contact,
        issue_date: request.issue_date,
        expiry_date: request.expiry_date,
        tax_rate: parse_tax_rate(request.tax_rate)?,
        currency: parse_currency(&request.currency)?,
        notes: request.notes,
        items: build_items(request.items)?,
    };

    let repo = QuotationRepository::new(state.pool.clone());
    let quotation = repo.create(new).await?;

    Ok((StatusCode::CREATED, Json(QuotationResponse::from(&quotation))))
}

/// Lists quotations, optionally filtered by status
pub async fn list_quotations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<QuotationResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<QuotationStatus>()
                .map_err(|e| ApiError::Validation(e.to_string()))
        })
        .transpose()?;

    let repo = QuotationRepository::new(state.pool.clone());
    let quotations = repo.list(status).await?;
    Ok(Json(quotations.iter().map(QuotationResponse::from).collect()))
}

/// Gets a quotation by ID
pub async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuotationResponse>, ApiError> {
    let repo = QuotationRepository::new(state.pool.clone());
    let quotation = repo.get(QuotationId::from_uuid(id)).await?;
    Ok(Json(QuotationResponse::from(&quotation)))
}

/// Replaces the line items of an editable quotation
pub async fn update_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItemsRequest>,
) -> Result<Json<QuotationResponse>, ApiError> {
    let repo = QuotationRepository::new(state.pool.clone());
    let quotation = repo
        .update_items(QuotationId::from_uuid(id), build_items(request.items)?)
        .await?;
    Ok(Json(QuotationResponse::from(&quotation)))
}

/// Sends a quotation to its contact.
///
/// The status flips to `sent` first; a delivery failure is reported in the
/// response but does not undo the transition.
pub async fn send_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SendQuotationResponse>, ApiError> {
    let repo = QuotationRepository::new(state.pool.clone());
    let quotation = repo.mark_sent(QuotationId::from_uuid(id)).await?;

    let delivered = state.notifier.notify_quotation(&quotation).await;

    Ok(Json(SendQuotationResponse {
        quotation: QuotationResponse::from(&quotation),
        delivered,
    }))
}

/// Records the client's acceptance
pub async fn accept_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuotationResponse>, ApiError> {
    let repo = QuotationRepository::new(state.pool.clone());
    let quotation = repo.accept(QuotationId::from_uuid(id)).await?;
    Ok(Json(QuotationResponse::from(&quotation)))
}

/// Records the client's rejection
pub async fn reject_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<QuotationResponse>, ApiError> {
    let repo = QuotationRepository::new(state.pool.clone());
    let quotation = repo.reject(QuotationId::from_uuid(id)).await?;
    Ok(Json(QuotationResponse::from(&quotation)))
}

/// Converts an accepted quotation into a draft invoice
pub async fn convert_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConvertQuotationRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let repo = QuotationRepository::new(state.pool.clone());
    let invoice = repo
        .convert_to_invoice(QuotationId::from_uuid(id), request.issue_date, request.due_date)
        .await?;
    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(&invoice))))
}
