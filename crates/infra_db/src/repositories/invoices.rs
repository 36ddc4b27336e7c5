//! Invoice repository
//!
//! Invoices are soft-deleted and number-allocated the same way quotations
//! are. Overdue is derived opportunistically: reads can ask for a status
//! refresh with an injected `today` instead of relying on a scheduler.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgConnection;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::line_items;
use core_kernel::{
    random_document_number, ClientId, Currency, DocumentKind, InvoiceId, Money, QuotationId,
    TaxRate, MAX_ALLOCATION_ATTEMPTS,
};
use domain_billing::{Invoice, InvoiceStatus, LineItem};
use domain_client::ContactSnapshot;

#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    invoice_number: String,
    quotation_id: Option<Uuid>,
    client_id: Uuid,
    contact_name: String,
    contact_email: String,
    contact_phone: Option<String>,
    contact_address: Option<String>,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    currency: String,
    tax_rate: Decimal,
    amount_paid: Decimal,
    status: String,
    notes: Option<String>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const INVOICE_COLUMNS: &str = r#"
    id, invoice_number, quotation_id, client_id,
    contact_name, contact_email, contact_phone, contact_address,
    issue_date, due_date, currency, tax_rate, amount_paid,
    status, notes, deleted_at, created_at, updated_at
"#;

impl InvoiceRow {
    fn into_domain(self, items: Vec<LineItem>) -> Result<Invoice, DatabaseError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: core_kernel::MoneyError| DatabaseError::SerializationError(e.to_string()))?;
        let status: InvoiceStatus = self
            .status
            .parse()
            .map_err(|e: domain_billing::BillingError| {
                DatabaseError::SerializationError(e.to_string())
            })?;
        let tax_rate = TaxRate::from_percentage(self.tax_rate)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        // Totals are always rederived from the raw item inputs
        let totals = domain_billing::recompute(&items, tax_rate, currency)?;

        Ok(Invoice {
            id: InvoiceId::from_uuid(self.id),
            invoice_number: self.invoice_number,
            quotation_ref: self.quotation_id.map(QuotationId::from_uuid),
            client_ref: ClientId::from_uuid(self.client_id),
            contact: ContactSnapshot {
                name: self.contact_name,
                email: self.contact_email,
                phone: self.contact_phone,
                address: self.contact_address,
            },
            issue_date: self.issue_date,
            due_date: self.due_date,
            currency,
            tax_rate,
            items,
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            amount_paid: Money::new(self.amount_paid, currency),
            status,
            notes: self.notes,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fields supplied when creating an invoice directly (not by conversion)
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub client_ref: ClientId,
    pub contact: ContactSnapshot,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub tax_rate: TaxRate,
    pub currency: Currency,
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
}

/// Inserts an invoice row inside an open transaction.
///
/// Shared with the quotation conversion path, which allocates the number
/// and inserts the cloned items itself.
pub(crate) async fn insert_invoice(
    conn: &mut PgConnection,
    invoice: &Invoice,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO invoices (
            id, invoice_number, quotation_id, client_id,
            contact_name, contact_email, contact_phone, contact_address,
            issue_date, due_date, currency, tax_rate,
            subtotal, tax_amount, total_amount, amount_paid,
            status, notes, deleted_at, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                  $13, $14, $15, $16, $17, $18, $19, $20, $21)
        "#,
    )
    .bind(*invoice.id.as_uuid())
    .bind(&invoice.invoice_number)
    .bind(invoice.quotation_ref.map(|q| *q.as_uuid()))
    .bind(*invoice.client_ref.as_uuid())
    .bind(&invoice.contact.name)
    .bind(&invoice.contact.email)
    .bind(&invoice.contact.phone)
    .bind(&invoice.contact.address)
    .bind(invoice.issue_date)
    .bind(invoice.due_date)
    .bind(invoice.currency.code())
    .bind(invoice.tax_rate.as_percentage())
    .bind(invoice.subtotal.amount())
    .bind(invoice.tax_amount.amount())
    .bind(invoice.total_amount.amount())
    .bind(invoice.amount_paid.amount())
    .bind(invoice.status.as_str())
    .bind(&invoice.notes)
    .bind(invoice.deleted_at)
    .bind(invoice.created_at)
    .bind(invoice.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    Ok(())
}

/// Fetches an invoice with a row lock, for payment recomputation
pub(crate) async fn fetch_for_update(
    conn: &mut PgConnection,
    id: InvoiceId,
) -> Result<Invoice, DatabaseError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
    ))
    .bind(*id.as_uuid())
    .fetch_optional(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?
    .ok_or_else(|| DatabaseError::not_found("Invoice", id))?;

    let items = line_items::load_for_invoice(&mut *conn, *id.as_uuid()).await?;
    row.into_domain(items)
}

/// Writes back the ledger-managed fields of an invoice
pub(crate) async fn persist_payment_state(
    conn: &mut PgConnection,
    invoice: &Invoice,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        UPDATE invoices
        SET amount_paid = $2, status = $3, updated_at = $4
        WHERE id = $1
        "#,
    )
    .bind(*invoice.id.as_uuid())
    .bind(invoice.amount_paid.amount())
    .bind(invoice.status.as_str())
    .bind(invoice.updated_at)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    Ok(())
}

/// Repository for invoices and their line items
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates an invoice, allocating its document number with bounded retry
    #[instrument(skip(self, new), fields(client = %new.client_ref))]
    pub async fn create(&self, new: NewInvoice) -> Result<Invoice, DatabaseError> {
        let mut invoice = Invoice::new(
            String::new(),
            new.client_ref,
            new.contact,
            new.issue_date,
            new.due_date,
            new.tax_rate,
            new.currency,
        );
        invoice.notes = new.notes;
        invoice.set_items(new.items)?;

        let year = new.issue_date.year();

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            invoice.invoice_number = random_document_number(DocumentKind::Invoice, year);

            match self.try_insert(&invoice).await {
                Ok(()) => return Ok(invoice),
                Err(e) if e.is_duplicate() => {
                    debug!(
                        attempt,
                        number = %invoice.invoice_number,
                        "Invoice number collision, rerolling"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(DatabaseError::NumberAllocationExhausted(format!(
            "invoice number for {year} after {MAX_ALLOCATION_ATTEMPTS} attempts"
        )))
    }

    async fn try_insert(&self, invoice: &Invoice) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        insert_invoice(&mut *tx, invoice).await?;
        line_items::insert_for_invoice(&mut *tx, *invoice.id.as_uuid(), &invoice.items).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Fetches an invoice with its line items; soft-deleted rows are hidden
    pub async fn get(&self, id: InvoiceId) -> Result<Invoice, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Invoice", id))?;

        let items = line_items::load_for_invoice(&mut *conn, *id.as_uuid()).await?;
        row.into_domain(items)
    }

    /// Fetches an invoice and refreshes its overdue status as of `today`.
    ///
    /// A forced transition is persisted before the invoice is returned.
    pub async fn get_refreshed(
        &self,
        id: InvoiceId,
        today: NaiveDate,
    ) -> Result<Invoice, DatabaseError> {
        let mut invoice = self.get(id).await?;
        if invoice.refresh_overdue(today) {
            let mut conn = self.pool.acquire().await?;
            persist_payment_state(&mut conn, &invoice).await?;
        }
        Ok(invoice)
    }

    /// Lists invoices, optionally filtered by status; soft-deleted hidden
    pub async fn list(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    r#"
                    SELECT {INVOICE_COLUMNS} FROM invoices
                    WHERE deleted_at IS NULL AND status = $1
                    ORDER BY issue_date DESC, created_at DESC
                    "#
                ))
                .bind(status.as_str())
                .fetch_all(&mut *conn)
                .await
            }
            None => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    r#"
                    SELECT {INVOICE_COLUMNS} FROM invoices
                    WHERE deleted_at IS NULL
                    ORDER BY issue_date DESC, created_at DESC
                    "#
                ))
                .fetch_all(&mut *conn)
                .await
            }
        }
        .map_err(DatabaseError::from_sqlx)?;

        let mut invoices = Vec::with_capacity(rows.len());
        for row in rows {
            let items = line_items::load_for_invoice(&mut *conn, row.id).await?;
            invoices.push(row.into_domain(items)?);
        }
        Ok(invoices)
    }

    /// Replaces the line items of an editable invoice
    pub async fn update_items(
        &self,
        id: InvoiceId,
        items: Vec<LineItem>,
    ) -> Result<Invoice, DatabaseError> {
        let mut invoice = self.get(id).await?;
        invoice.set_items(items)?;

        let mut tx = self.pool.begin().await?;
        line_items::replace_for_invoice(&mut *tx, *id.as_uuid(), &invoice.items).await?;
        sqlx::query(
            r#"
            UPDATE invoices
            SET subtotal = $2, tax_amount = $3, total_amount = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .bind(invoice.subtotal.amount())
        .bind(invoice.tax_amount.amount())
        .bind(invoice.total_amount.amount())
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        tx.commit().await?;

        Ok(invoice)
    }

    /// Marks an invoice as sent (idempotent)
    pub async fn mark_sent(&self, id: InvoiceId) -> Result<Invoice, DatabaseError> {
        let mut invoice = self.get(id).await?;
        invoice.send();
        let mut conn = self.pool.acquire().await?;
        persist_payment_state(&mut conn, &invoice).await?;
        Ok(invoice)
    }

    /// Cancels an invoice
    pub async fn cancel(&self, id: InvoiceId) -> Result<Invoice, DatabaseError> {
        let mut invoice = self.get(id).await?;
        invoice.cancel()?;
        let mut conn = self.pool.acquire().await?;
        persist_payment_state(&mut conn, &invoice).await?;
        Ok(invoice)
    }

    /// Soft-deletes an invoice; the row and its payments remain
    pub async fn soft_delete(&self, id: InvoiceId) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE invoices SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(*id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Invoice", id));
        }
        Ok(())
    }
}
