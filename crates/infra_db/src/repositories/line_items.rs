//! Line item persistence shared by the quotation and invoice repositories
//!
//! Line items are exclusively owned: each row points at exactly one parent
//! document and is replaced wholesale when the document's items change.
//! Foreign keys cascade on delete.

use rust_decimal::Decimal;
use sqlx::postgres::PgConnection;
use uuid::Uuid;

use crate::error::DatabaseError;
use core_kernel::LineItemId;
use domain_billing::LineItem;

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: Uuid,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    position: i32,
}

impl LineItemRow {
    fn into_domain(self) -> LineItem {
        LineItem {
            id: LineItemId::from_uuid(self.id),
            description: self.description,
            quantity: self.quantity,
            unit_price: self.unit_price,
            position: self.position as u32,
        }
    }
}

pub(crate) async fn load_for_quotation(
    conn: &mut PgConnection,
    quotation_id: Uuid,
) -> Result<Vec<LineItem>, DatabaseError> {
    let rows = sqlx::query_as::<_, LineItemRow>(
        r#"
        SELECT id, description, quantity, unit_price, position
        FROM line_items
        WHERE quotation_id = $1
        ORDER BY position
        "#,
    )
    .bind(quotation_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    Ok(rows.into_iter().map(LineItemRow::into_domain).collect())
}

pub(crate) async fn load_for_invoice(
    conn: &mut PgConnection,
    invoice_id: Uuid,
) -> Result<Vec<LineItem>, DatabaseError> {
    let rows = sqlx::query_as::<_, LineItemRow>(
        r#"
        SELECT id, description, quantity, unit_price, position
        FROM line_items
        WHERE invoice_id = $1
        ORDER BY position
        "#,
    )
    .bind(invoice_id)
    .fetch_all(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    Ok(rows.into_iter().map(LineItemRow::into_domain).collect())
}

pub(crate) async fn insert_for_quotation(
    conn: &mut PgConnection,
    quotation_id: Uuid,
    items: &[LineItem],
) -> Result<(), DatabaseError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO line_items (id, quotation_id, description, quantity, unit_price, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*item.id.as_uuid())
        .bind(quotation_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.position as i32)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;
    }
    Ok(())
}

pub(crate) async fn insert_for_invoice(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    items: &[LineItem],
) -> Result<(), DatabaseError> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO line_items (id, invoice_id, description, quantity, unit_price, position)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*item.id.as_uuid())
        .bind(invoice_id)
        .bind(&item.description)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.position as i32)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;
    }
    Ok(())
}

pub(crate) async fn replace_for_quotation(
    conn: &mut PgConnection,
    quotation_id: Uuid,
    items: &[LineItem],
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM line_items WHERE quotation_id = $1")
        .bind(quotation_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;
    insert_for_quotation(conn, quotation_id, items).await
}

pub(crate) async fn replace_for_invoice(
    conn: &mut PgConnection,
    invoice_id: Uuid,
    items: &[LineItem],
) -> Result<(), DatabaseError> {
    sqlx::query("DELETE FROM line_items WHERE invoice_id = $1")
        .bind(invoice_id)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_sqlx)?;
    insert_for_invoice(conn, invoice_id, items).await
}
