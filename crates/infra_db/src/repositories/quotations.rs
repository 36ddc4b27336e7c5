//! Quotation repository
//!
//! Number allocation relies on the unique index over `quotation_number`:
//! the insert is attempted with a fresh random number and retried on a
//! duplicate-key conflict, up to the kernel's attempt cap.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::repositories::line_items;
use core_kernel::{
    random_document_number, ClientId, Currency, DocumentKind, QuotationId, TaxRate,
    MAX_ALLOCATION_ATTEMPTS,
};
use domain_billing::{Invoice, LineItem, Quotation, QuotationStatus};
use domain_client::ContactSnapshot;

#[derive(Debug, sqlx::FromRow)]
struct QuotationRow {
    id: Uuid,
    quotation_number: String,
    client_id: Uuid,
    contact_name: String,
    contact_email: String,
    contact_phone: Option<String>,
    contact_address: Option<String>,
    issue_date: NaiveDate,
    expiry_date: NaiveDate,
    currency: String,
    tax_rate: Decimal,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl QuotationRow {
    fn into_domain(self, items: Vec<LineItem>) -> Result<Quotation, DatabaseError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: core_kernel::MoneyError| DatabaseError::SerializationError(e.to_string()))?;
        let status: QuotationStatus = self
            .status
            .parse()
            .map_err(|e: domain_billing::BillingError| {
                DatabaseError::SerializationError(e.to_string())
            })?;
        let tax_rate = TaxRate::from_percentage(self.tax_rate)
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        // Totals are always rederived from the raw item inputs
        let totals = domain_billing::recompute(&items, tax_rate, currency)?;

        Ok(Quotation {
            id: QuotationId::from_uuid(self.id),
            quotation_number: self.quotation_number,
            client_ref: ClientId::from_uuid(self.client_id),
            contact: ContactSnapshot {
                name: self.contact_name,
                email: self.contact_email,
                phone: self.contact_phone,
                address: self.contact_address,
            },
            issue_date: self.issue_date,
            expiry_date: self.expiry_date,
            currency,
            tax_rate,
            items,
            subtotal: totals.subtotal,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            status,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Fields supplied when creating a quotation; the number is allocated here
#[derive(Debug, Clone)]
pub struct NewQuotation {
    pub client_ref: ClientId,
    pub contact: ContactSnapshot,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub tax_rate: TaxRate,
    pub currency: Currency,
    pub notes: Option<String>,
    pub items: Vec<LineItem>,
}

/// Repository for quotations and their line items
#[derive(Debug, Clone)]
pub struct QuotationRepository {
    pool: PgPool,
}

impl QuotationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a quotation, allocating its document number.
    ///
    /// The insert runs with a fresh `QT-YYYY-NNNNNN` candidate and retries
    /// on a unique-index conflict; exhausting the attempts is fatal for this
    /// request.
    #[instrument(skip(self, new), fields(client = %new.client_ref))]
    pub async fn create(&self, new: NewQuotation) -> Result<Quotation, DatabaseError> {
        let mut quotation = Quotation::new(
            String::new(),
            new.client_ref,
            new.contact,
            new.issue_date,
            new.expiry_date,
            new.tax_rate,
            new.currency,
        );
        quotation.notes = new.notes;
        quotation.set_items(new.items)?;

        let year = new.issue_date.year();

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            quotation.quotation_number = random_document_number(DocumentKind::Quotation, year);

            match self.try_insert(&quotation).await {
                Ok(()) => return Ok(quotation),
                Err(e) if e.is_duplicate() => {
                    debug!(
                        attempt,
                        number = %quotation.quotation_number,
                        "Quotation number collision, rerolling"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(DatabaseError::NumberAllocationExhausted(format!(
            "quotation number for {year} after {MAX_ALLOCATION_ATTEMPTS} attempts"
        )))
    }

    async fn try_insert(&self, quotation: &Quotation) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quotations (
                id, quotation_number, client_id,
                contact_name, contact_email, contact_phone, contact_address,
                issue_date, expiry_date, currency, tax_rate,
                subtotal, tax_amount, total_amount,
                status, notes, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                      $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(*quotation.id.as_uuid())
        .bind(&quotation.quotation_number)
        .bind(*quotation.client_ref.as_uuid())
        .bind(&quotation.contact.name)
        .bind(&quotation.contact.email)
        .bind(&quotation.contact.phone)
        .bind(&quotation.contact.address)
        .bind(quotation.issue_date)
        .bind(quotation.expiry_date)
        .bind(quotation.currency.code())
        .bind(quotation.tax_rate.as_percentage())
        .bind(quotation.subtotal.amount())
        .bind(quotation.tax_amount.amount())
        .bind(quotation.total_amount.amount())
        .bind(quotation.status.as_str())
        .bind(&quotation.notes)
        .bind(quotation.created_at)
        .bind(quotation.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        line_items::insert_for_quotation(&mut *tx, *quotation.id.as_uuid(), &quotation.items)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Fetches a quotation with its line items
    pub async fn get(&self, id: QuotationId) -> Result<Quotation, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let row = sqlx::query_as::<_, QuotationRow>(
            r#"
            SELECT id, quotation_number, client_id,
                   contact_name, contact_email, contact_phone, contact_address,
                   issue_date, expiry_date, currency, tax_rate,
                   status, notes, created_at, updated_at
            FROM quotations
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Quotation", id))?;

        let items = line_items::load_for_quotation(&mut *conn, *id.as_uuid()).await?;
        row.into_domain(items)
    }

    /// Lists quotations, optionally filtered by status
    pub async fn list(
        &self,
        status: Option<QuotationStatus>,
    ) -> Result<Vec<Quotation>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;

        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, QuotationRow>(
                    r#"
                    SELECT id, quotation_number, client_id,
                           contact_name, contact_email, contact_phone, contact_address,
                           issue_date, expiry_date, currency, tax_rate,
                           status, notes, created_at, updated_at
                    FROM quotations
                    WHERE status = $1
                    ORDER BY issue_date DESC, created_at DESC
                    "#,
                )
                .bind(status.as_str())
                .fetch_all(&mut *conn)
                .await
            }
            None => {
                sqlx::query_as::<_, QuotationRow>(
                    r#"
                    SELECT id, quotation_number, client_id,
                           contact_name, contact_email, contact_phone, contact_address,
                           issue_date, expiry_date, currency, tax_rate,
                           status, notes, created_at, updated_at
                    FROM quotations
                    ORDER BY issue_date DESC, created_at DESC
                    "#,
                )
                .fetch_all(&mut *conn)
                .await
            }
        }
        .map_err(DatabaseError::from_sqlx)?;

        let mut quotations = Vec::with_capacity(rows.len());
        for row in rows {
            let items = line_items::load_for_quotation(&mut *conn, row.id).await?;
            quotations.push(row.into_domain(items)?);
        }
        Ok(quotations)
    }

    /// Replaces the line items of an editable quotation
    pub async fn update_items(
        &self,
        id: QuotationId,
        items: Vec<LineItem>,
    ) -> Result<Quotation, DatabaseError> {
        let mut quotation = self.get(id).await?;
        quotation.set_items(items)?;

        let mut tx = self.pool.begin().await?;
        line_items::replace_for_quotation(&mut *tx, *id.as_uuid(), &quotation.items).await?;
        self.persist_totals(&mut *tx, &quotation).await?;
        tx.commit().await?;

        Ok(quotation)
    }

    /// Marks a quotation as sent (idempotent)
    pub async fn mark_sent(&self, id: QuotationId) -> Result<Quotation, DatabaseError> {
        let mut quotation = self.get(id).await?;
        quotation.send();
        self.persist_status(&quotation).await?;
        Ok(quotation)
    }

    /// Records the client's acceptance
    pub async fn accept(&self, id: QuotationId) -> Result<Quotation, DatabaseError> {
        let mut quotation = self.get(id).await?;
        quotation.accept()?;
        self.persist_status(&quotation).await?;
        Ok(quotation)
    }

    /// Records the client's rejection
    pub async fn reject(&self, id: QuotationId) -> Result<Quotation, DatabaseError> {
        let mut quotation = self.get(id).await?;
        quotation.reject()?;
        self.persist_status(&quotation).await?;
        Ok(quotation)
    }

    /// Converts an accepted quotation into a draft invoice.
    ///
    /// Runs in one transaction: the quotation row is locked, flipped to
    /// `invoiced`, and the new invoice (with cloned items) is inserted with
    /// a freshly allocated number. Either both documents change or neither.
    #[instrument(skip(self))]
    pub async fn convert_to_invoice(
        &self,
        id: QuotationId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Result<Invoice, DatabaseError> {
        let year = issue_date.year();

        // A duplicate invoice number aborts the whole transaction, so each
        // attempt restarts it with a fresh candidate.
        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let number = random_document_number(DocumentKind::Invoice, year);
            match self.try_convert(id, issue_date, due_date, number).await {
                Ok(invoice) => return Ok(invoice),
                Err(e) if e.is_duplicate() => {
                    debug!(attempt, "Invoice number collision, rerolling");
                }
                Err(e) => return Err(e),
            }
        }

        Err(DatabaseError::NumberAllocationExhausted(format!(
            "invoice number for {year} after {MAX_ALLOCATION_ATTEMPTS} attempts"
        )))
    }

    async fn try_convert(
        &self,
        id: QuotationId,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        invoice_number: String,
    ) -> Result<Invoice, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, QuotationRow>(
            r#"
            SELECT id, quotation_number, client_id,
                   contact_name, contact_email, contact_phone, contact_address,
                   issue_date, expiry_date, currency, tax_rate,
                   status, notes, created_at, updated_at
            FROM quotations
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Quotation", id))?;

        let items = line_items::load_for_quotation(&mut *tx, *id.as_uuid()).await?;
        let mut quotation = row.into_domain(items)?;

        let invoice =
            Invoice::from_quotation(&mut quotation, invoice_number, issue_date, due_date)?;

        crate::repositories::invoices::insert_invoice(&mut *tx, &invoice).await?;
        line_items::insert_for_invoice(&mut *tx, *invoice.id.as_uuid(), &invoice.items).await?;

        sqlx::query("UPDATE quotations SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(quotation.status.as_str())
            .bind(quotation.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        tx.commit().await?;
        Ok(invoice)
    }

    async fn persist_status(&self, quotation: &Quotation) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE quotations SET status = $2, updated_at = $3 WHERE id = $1",
        )
        .bind(*quotation.id.as_uuid())
        .bind(quotation.status.as_str())
        .bind(quotation.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Quotation", quotation.id));
        }
        Ok(())
    }

    async fn persist_totals(
        &self,
        tx: &mut sqlx::PgConnection,
        quotation: &Quotation,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            UPDATE quotations
            SET subtotal = $2, tax_amount = $3, total_amount = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(*quotation.id.as_uuid())
        .bind(quotation.subtotal.amount())
        .bind(quotation.tax_amount.amount())
        .bind(quotation.total_amount.amount())
        .bind(quotation.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from_sqlx)?;
        Ok(())
    }
}
