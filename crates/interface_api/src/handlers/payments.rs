//! Payment handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::dto::billing::{LedgerResponse, PaymentResponse, RecordPaymentRequest};
use crate::{error::ApiError, AppState};
use core_kernel::{ClientId, InvoiceId, PaymentId};
use domain_billing::PaymentMethod;
use infra_db::{InvoiceRepository, NewPayment, PaymentRepository};

/// Records a payment against an invoice and returns the recomputed ledger.
///
/// A receipt email is attempted after the payment commits; delivery failure
/// is reported in the response but never undoes the payment.
pub async fn record_payment(
    State(state): State<AppState>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<LedgerResponse>), ApiError> {
    let method: PaymentMethod = request
        .method
        .parse()
        .map_err(|e: domain_billing::BillingError| ApiError::Validation(e.to_string()))?;

    let new = NewPayment {
        invoice_ref: InvoiceId::from_uuid(request.invoice_id),
        client_ref: request.client_id.map(ClientId::from_uuid),
        amount: request.amount,
        payment_date: request.payment_date,
        method,
        transaction_reference: request.transaction_reference,
        notes: request.notes,
    };

    let repo = PaymentRepository::new(state.pool.clone());
    let (payment, outcome) = repo.record(new, Utc::now().date_naive()).await?;

    let invoices = InvoiceRepository::new(state.pool.clone());
    let invoice = invoices.get(payment.invoice_ref).await?;
    let delivered = state.notifier.notify_receipt(&invoice, &payment).await;

    Ok((
        StatusCode::CREATED,
        Json(LedgerResponse::from_outcome(Some(&payment), &outcome).with_receipt(delivered)),
    ))
}

/// Gets a payment by ID
pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, ApiError> {
    let repo = PaymentRepository::new(state.pool.clone());
    let payment = repo.get(PaymentId::from_uuid(id)).await?;
    Ok(Json(PaymentResponse::from(&payment)))
}

/// Deletes a payment; the invoice's status is recomputed from what remains
pub async fn delete_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LedgerResponse>, ApiError> {
    let repo = PaymentRepository::new(state.pool.clone());
    let outcome = repo.delete(PaymentId::from_uuid(id), Utc::now().date_naive()).await?;
    Ok(Json(LedgerResponse::from_outcome(None, &outcome)))
}
