//! Invoice handlers
//!
//! Reads refresh the overdue status against the current date before the
//! invoice is returned, so a past-due invoice shows `overdue` without any
//! background job having touched it.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::dto::billing::{
    CreateInvoiceRequest, InvoiceResponse, PaymentResponse, SendInvoiceResponse,
    UpdateItemsRequest,
};
use crate::handlers::quotations::{build_items, parse_currency, parse_tax_rate};
use crate::{error::ApiError, AppState};
use core_kernel::{ClientId, InvoiceId};
use domain_billing::InvoiceStatus;
use infra_db::{ClientRepository, InvoiceRepository, NewInvoice, PaymentRepository};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Creates a draft invoice directly, without a quotation
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<InvoiceResponse>), ApiError> {
    let clients = ClientRepository::new(state.pool.clone());
    let client = clients.get_active(ClientId::from_uuid(request.client_id)).await?;
    let contact = client.contact_snapshot()?;

    let new = NewInvoice {
        client_ref: client.id,
        contact,
        issue_date: request.issue_date,
        due_date: request.due_date,
        tax_rate: parse_tax_rate(request.tax_rate)?,
        currency: parse_currency(&request.currency)?,
        notes: request.notes,
        items: build_items(request.items)?,
    };

    let repo = InvoiceRepository::new(state.pool.clone());
    let invoice = repo.create(new).await?;

    Ok((StatusCode::CREATED, Json(InvoiceResponse::from(&invoice))))
}

/// Lists invoices, optionally filtered by status
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<InvoiceResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(|s| {
            s.parse::<InvoiceStatus>()
                .map_err(|e| ApiError::Validation(e.to_string()))
        })
        .transpose()?;

    let repo = InvoiceRepository::new(state.pool.clone());
    let invoices = repo.list(status).await?;
    Ok(Json(invoices.iter().map(InvoiceResponse::from).collect()))
}

/// Gets an invoice by ID with its overdue status refreshed
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let repo = InvoiceRepository::new(state.pool.clone());
    let invoice = repo
        .get_refreshed(InvoiceId::from_uuid(id), Utc::now().date_naive())
        .await?;
    Ok(Json(InvoiceResponse::from(&invoice)))
}

/// Replaces the line items of an editable invoice
pub async fn update_items(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateItemsRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let repo = InvoiceRepository::new(state.pool.clone());
    let invoice = repo
        .update_items(InvoiceId::from_uuid(id), build_items(request.items)?)
        .await?;
    Ok(Json(InvoiceResponse::from(&invoice)))
}

/// Sends an invoice to its contact; delivery failure does not undo the
/// status transition
pub async fn send_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SendInvoiceResponse>, ApiError> {
    let repo = InvoiceRepository::new(state.pool.clone());
    let invoice = repo.mark_sent(InvoiceId::from_uuid(id)).await?;

    let delivered = state.notifier.notify_invoice(&invoice).await;

    Ok(Json(SendInvoiceResponse {
        invoice: InvoiceResponse::from(&invoice),
        delivered,
    }))
}

/// Cancels an invoice
pub async fn cancel_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    let repo = InvoiceRepository::new(state.pool.clone());
    let invoice = repo.cancel(InvoiceId::from_uuid(id)).await?;
    Ok(Json(InvoiceResponse::from(&invoice)))
}

/// Soft-deletes an invoice
pub async fn delete_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = InvoiceRepository::new(state.pool.clone());
    repo.soft_delete(InvoiceId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the payments recorded against an invoice
pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PaymentResponse>>, ApiError> {
    let repo = PaymentRepository::new(state.pool.clone());
    let payments = repo.list_for_invoice(InvoiceId::from_uuid(id)).await?;
    Ok(Json(payments.iter().map(PaymentResponse::from).collect()))
}
