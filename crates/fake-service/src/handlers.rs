//! Collection and item handlers shared by every schema.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Form, Json,
};
use serde_json::Value;

use crate::error::ServiceError;
use crate::store::Store;

type FormFields = Vec<(String, String)>;

fn parse_id(raw: &str) -> Result<u64, ServiceError> {
    raw.parse()
        .map_err(|_| ServiceError::not_found("Not found."))
}

/// GET `/{collection}/`
pub async fn list(
    State(store): State<Arc<Store>>,
    Path(collection): Path<String>,
) -> Result<Json<Vec<Value>>, ServiceError> {
    let schema = store.schema(&collection)?;
    Ok(Json(store.list(schema)?))
}

/// POST `/{collection}/`
pub async fn create(
    State(store): State<Arc<Store>>,
    Path(collection): Path<String>,
    Form(fields): Form<FormFields>,
) -> Result<(StatusCode, Json<Value>), ServiceError> {
    let schema = store.schema(&collection)?;
    let record = store.create(schema, &fields)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// GET `/{collection}/{id}`
pub async fn read(
    State(store): State<Arc<Store>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Value>, ServiceError> {
    let schema = store.schema(&collection)?;
    Ok(Json(store.read(schema, parse_id(&id)?)?))
}

/// PUT `/{collection}/{id}`
pub async fn update(
    State(store): State<Arc<Store>>,
    Path((collection, id)): Path<(String, String)>,
    Form(fields): Form<FormFields>,
) -> Result<Json<Value>, ServiceError> {
    let schema = store.schema(&collection)?;
    Ok(Json(store.update(schema, parse_id(&id)?, &fields)?))
}

/// DELETE `/{collection}/{id}`
pub async fn delete(
    State(store): State<Arc<Store>>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, ServiceError> {
    let schema = store.schema(&collection)?;
    store.delete(schema, parse_id(&id)?)?;
    Ok(StatusCode::NO_CONTENT)
}
