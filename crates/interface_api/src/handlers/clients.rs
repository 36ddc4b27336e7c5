//! Client handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::client::{ClientResponse, CreateClientRequest, UpdateClientRequest};
use crate::{error::ApiError, AppState};
use core_kernel::ClientId;
use domain_client::Client;
use infra_db::ClientRepository;

/// Registers a new client
pub async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), ApiError> {
    let mut client = Client::new(request.name, request.email)?;
    client.phone = request.phone;
    client.address = request.address;
    client.tax_number = request.tax_number;
    client.notes = request.notes;

    let repo = ClientRepository::new(state.pool.clone());
    repo.create(&client).await?;

    Ok((StatusCode::CREATED, Json(ClientResponse::from(&client))))
}

/// Lists active clients
pub async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClientResponse>>, ApiError> {
    let repo = ClientRepository::new(state.pool.clone());
    let clients = repo.list().await?;
    Ok(Json(clients.iter().map(ClientResponse::from).collect()))
}

/// Gets an active client by ID
pub async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientResponse>, ApiError> {
    let repo = ClientRepository::new(state.pool.clone());
    let client = repo.get_active(ClientId::from_uuid(id)).await?;
    Ok(Json(ClientResponse::from(&client)))
}

/// Updates a client's details
pub async fn update_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, ApiError> {
    let repo = ClientRepository::new(state.pool.clone());
    let mut client = repo.get_active(ClientId::from_uuid(id)).await?;

    if let Some(name) = request.name {
        client.name = name;
    }
    if let Some(email) = request.email {
        client.email = email;
    }
    if request.phone.is_some() {
        client.phone = request.phone;
    }
    if request.address.is_some() {
        client.address = request.address;
    }
    if request.tax_number.is_some() {
        client.tax_number = request.tax_number;
    }
    if request.notes.is_some() {
        client.notes = request.notes;
    }
    client
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    repo.update(&client).await?;
    Ok(Json(ClientResponse::from(&client)))
}

/// Soft-deletes a client; existing documents keep their contact snapshots
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = ClientRepository::new(state.pool.clone());
    repo.soft_delete(ClientId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
