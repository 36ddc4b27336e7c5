//! Client repository
//!
//! Clients are soft-deleted; every listing query filters `deleted_at`
//! explicitly.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;
use core_kernel::ClientId;
use domain_client::Client;

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    tax_number: Option<String>,
    notes: Option<String>,
    deleted_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClientRow {
    fn into_domain(self) -> Client {
        Client {
            id: ClientId::from_uuid(self.id),
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            tax_number: self.tax_number,
            notes: self.notes,
            deleted_at: self.deleted_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Repository for client records
#[derive(Debug, Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new client record
    pub async fn create(&self, client: &Client) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO clients (
                id, name, email, phone, address, tax_number, notes,
                deleted_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*client.id.as_uuid())
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.tax_number)
        .bind(&client.notes)
        .bind(client.deleted_at)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(())
    }

    /// Fetches a client by id, including soft-deleted records
    pub async fn get(&self, id: ClientId) -> Result<Client, DatabaseError> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, email, phone, address, tax_number, notes,
                   deleted_at, created_at, updated_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?
        .ok_or_else(|| DatabaseError::not_found("Client", id))?;

        Ok(row.into_domain())
    }

    /// Fetches a client that has not been soft-deleted
    pub async fn get_active(&self, id: ClientId) -> Result<Client, DatabaseError> {
        let client = self.get(id).await?;
        if client.is_deleted() {
            return Err(DatabaseError::not_found("Client", id));
        }
        Ok(client)
    }

    /// Lists all clients that have not been soft-deleted
    pub async fn list(&self) -> Result<Vec<Client>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, email, phone, address, tax_number, notes,
                   deleted_at, created_at, updated_at
            FROM clients
            WHERE deleted_at IS NULL
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        Ok(rows.into_iter().map(ClientRow::into_domain).collect())
    }

    /// Updates the mutable fields of a client record
    pub async fn update(&self, client: &Client) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = $2, email = $3, phone = $4, address = $5,
                tax_number = $6, notes = $7, updated_at = $8
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(*client.id.as_uuid())
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.tax_number)
        .bind(&client.notes)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Client", client.id));
        }
        Ok(())
    }

    /// Soft-deletes a client
    pub async fn soft_delete(&self, id: ClientId) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE clients SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(*id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Client", id));
        }
        Ok(())
    }
}
