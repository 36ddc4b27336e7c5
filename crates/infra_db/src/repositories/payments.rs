//! Payment repository
//!
//! Recording or deleting a payment is the only way an invoice's
//! `amount_paid` and payment status change. Both run inside a single
//! transaction that locks the invoice row, so concurrent payments against
//! the same invoice serialize and each recomputation sees every committed
//! payment.
//!
//! Payment numbers are sequential per calendar year (`PAY-YYYY-NNNN`). The
//! next sequence is read under the invoice lock with a `MAX` scan; a unique
//! index on `payment_number` backstops the rare cross-invoice race, which
//! is retried.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgConnection;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::invoices;
use core_kernel::{next_payment_number, ClientId, InvoiceId, Money, PaymentId};
use domain_billing::{ledger, LedgerOutcome, Payment, PaymentMethod};

const PAYMENT_NUMBER_ATTEMPTS: u32 = 3;

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    payment_number: String,
    invoice_id: Uuid,
    client_id: Uuid,
    amount: Decimal,
    currency: String,
    payment_date: NaiveDate,
    method: String,
    transaction_reference: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

const PAYMENT_COLUMNS: &str = r#"
    id, payment_number, invoice_id, client_id, amount, currency,
    payment_date, method, transaction_reference, notes, created_at
"#;

impl PaymentRow {
    fn into_domain(self) -> Result<Payment, DatabaseError> {
        let currency: core_kernel::Currency = self
            .currency
            .parse()
            .map_err(|e: core_kernel::MoneyError| DatabaseError::SerializationError(e.to_string()))?;
        let method: PaymentMethod = self
            .method
            .parse()
            .map_err(|e: domain_billing::BillingError| {
                DatabaseError::SerializationError(e.to_string())
            })?;

        Ok(Payment {
            id: PaymentId::from_uuid(self.id),
            payment_number: self.payment_number,
            invoice_ref: InvoiceId::from_uuid(self.invoice_id),
            client_ref: ClientId::from_uuid(self.client_id),
            amount: Money::new(self.amount, currency),
            payment_date: self.payment_date,
            method,
            transaction_reference: self.transaction_reference,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

/// Fields supplied when recording a payment
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub invoice_ref: InvoiceId,
    /// Defaults to the invoice's client when not supplied
    pub client_ref: Option<ClientId>,
    pub amount: Decimal,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub transaction_reference: Option<String>,
    pub notes: Option<String>,
}

async fn load_for_invoice(
    conn: &mut PgConnection,
    invoice_id: Uuid,
) -> Result<Vec<Payment>, DatabaseError> {
    let rows = sqlx::query_as::<_, PaymentRow>(&format!(
        r#"
        SELECT {PAYMENT_COLUMNS} FROM payments
        WHERE invoice_id = $1
        ORDER BY payment_date, created_at
        "#
    ))
    .bind(invoice_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    rows.into_iter().map(PaymentRow::into_domain).collect()
}

async fn last_sequence_for_year(
    conn: &mut PgConnection,
    year: i32,
) -> Result<u32, DatabaseError> {
    let last: i32 =
        sqlx::query_scalar("SELECT COALESCE(MAX(sequence_no), 0) FROM payments WHERE number_year = $1")
            .bind(year)
            .fetch_one(&mut *conn)
            .await
            .map_err(DatabaseError::from_sqlx)?;
    Ok(last as u32)
}

async fn insert_payment(
    conn: &mut PgConnection,
    payment: &Payment,
    year: i32,
    sequence: u32,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, payment_number, number_year, sequence_no,
            invoice_id, client_id, amount, currency, payment_date,
            method, transaction_reference, notes, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(*payment.id.as_uuid())
    .bind(&payment.payment_number)
    .bind(year)
    .bind(sequence as i32)
    .bind(*payment.invoice_ref.as_uuid())
    .bind(*payment.client_ref.as_uuid())
    .bind(payment.amount.amount())
    .bind(payment.amount.currency().code())
    .bind(payment.payment_date)
    .bind(payment.method.as_str())
    .bind(&payment.transaction_reference)
    .bind(&payment.notes)
    .bind(payment.created_at)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    Ok(())
}

/// Repository for payments and the ledger they drive
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a payment and recomputes the invoice's payment status.
    ///
    /// The invoice row is locked for the duration, its status recomputed
    /// from every payment on record plus the new one, and both rows
    /// committed together. `today` drives the overdue check.
    #[instrument(skip(self, new), fields(invoice = %new.invoice_ref))]
    pub async fn record(
        &self,
        new: NewPayment,
        today: NaiveDate,
    ) -> Result<(Payment, LedgerOutcome), DatabaseError> {
        for attempt in 1..=PAYMENT_NUMBER_ATTEMPTS {
            match self.try_record(&new, today).await {
                Ok(done) => return Ok(done),
                Err(e) if e.is_duplicate() && attempt < PAYMENT_NUMBER_ATTEMPTS => {
                    debug!(attempt, "Payment number collision, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        unreachable!("loop returns on every branch of the final attempt")
    }

    async fn try_record(
        &self,
        new: &NewPayment,
        today: NaiveDate,
    ) -> Result<(Payment, LedgerOutcome), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mut invoice = invoices::fetch_for_update(&mut *tx, new.invoice_ref).await?;
        let prior = load_for_invoice(&mut *tx, *invoice.id.as_uuid()).await?;

        let year = new.payment_date.year();
        let last_sequence = last_sequence_for_year(&mut *tx, year).await?;
        let payment_number = next_payment_number(year, last_sequence)
            .map_err(|e| DatabaseError::NumberAllocationExhausted(e.to_string()))?;

        let mut payment = Payment::new(
            payment_number,
            invoice.id,
            new.client_ref.unwrap_or(invoice.client_ref),
            Money::new(new.amount, invoice.currency),
            new.payment_date,
            new.method,
        )?;
        payment.transaction_reference = new.transaction_reference.clone();
        payment.notes = new.notes.clone();

        let outcome = ledger::apply_payment(&mut invoice, &prior, &payment, today)?;

        insert_payment(&mut *tx, &payment, year, last_sequence + 1).await?;
        invoices::persist_payment_state(&mut *tx, &invoice).await?;

        tx.commit().await?;
        Ok((payment, outcome))
    }

    /// Deletes a payment and recomputes the invoice from what remains.
    ///
    /// A fully paid invoice whose covering payment is removed reverts to
    /// `sent`, or straight to `overdue` when past due as of `today`.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        id: PaymentId,
        today: NaiveDate,
    ) -> Result<LedgerOutcome, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Payment", id))?;
        let payment = row.into_domain()?;

        let mut invoice = invoices::fetch_for_update(&mut *tx, payment.invoice_ref).await?;

        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        let remaining = load_for_invoice(&mut *tx, *invoice.id.as_uuid()).await?;
        let outcome = ledger::remove_payment(&mut invoice, &remaining, today)?;

        invoices::persist_payment_state(&mut *tx, &invoice).await?;

        tx.commit().await?;
        Ok(outcome)
    }

    /// Fetches a payment by id
    pub async fn get(&self, id: PaymentId) -> Result<Payment, DatabaseError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Payment", id))?;

        row.into_domain()
    }

    /// Lists the payments recorded against an invoice, oldest first
    pub async fn list_for_invoice(
        &self,
        invoice_id: InvoiceId,
    ) -> Result<Vec<Payment>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        load_for_invoice(&mut conn, *invoice_id.as_uuid()).await
    }
}
