//! Dataset routes: upload (multipart), listing, and retrieval by locator.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use kiln_abstraction::{StoreLocator, StoreObject, WritePrecondition};
use kiln_training::{dataset_name_for_file, update_registry};
use std::collections::BTreeMap;
use tracing::info;

use crate::schemas::StoredObjectResponse;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_dataset))
        .route("/", get(list_datasets))
        .route("/*locator", get(get_dataset))
}

/// Uploads a dataset file and records it in the dataset registry.
///
/// Multipart fields: `file` (required), `formatting` (optional string),
/// `columns` (optional JSON object of field name -> role).
async fn upload_dataset(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StoredObjectResponse>, ApiError> {
    let mut file_name: Option<String> = None;
    let mut bytes: Option<Vec<u8>> = None;
    let mut formatting: Option<String> = None;
    let mut columns: Option<BTreeMap<String, String>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                file_name = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read file: {e}")))?;
                bytes = Some(data.to_vec());
            }
            Some("formatting") => {
                formatting = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("failed to read formatting: {e}"))
                })?);
            }
            Some("columns") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("failed to read columns: {e}"))
                })?;
                columns = Some(serde_json::from_str(&text).map_err(|e| {
                    ApiError::BadRequest(format!("columns must be a JSON object: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let file_name =
        file_name.ok_or_else(|| ApiError::BadRequest("missing file field".to_string()))?;
    let bytes = bytes.ok_or_else(|| ApiError::BadRequest("empty file field".to_string()))?;

    let destination = format!("datasets/{file_name}");
    let gcs_url = state.store.put(&destination, bytes, WritePrecondition::None).await?;

    let dataset_name = dataset_name_for_file(&file_name);
    update_registry(state.store.as_ref(), dataset_name, &file_name, formatting, columns).await?;

    info!(dataset = %dataset_name, url = %gcs_url, "dataset uploaded");
    Ok(Json(StoredObjectResponse {
        message: format!("Dataset uploaded to {gcs_url}"),
        gcs_url,
    }))
}

/// Lists all uploaded datasets.
async fn list_datasets(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoreObject>>, ApiError> {
    let files = state.store.list("datasets/").await?;
    Ok(Json(files))
}

/// Retrieves a dataset's raw bytes by its fully-qualified store locator.
async fn get_dataset(
    State(state): State<AppState>,
    Path(locator): Path<String>,
) -> Result<Vec<u8>, ApiError> {
    let locator = StoreLocator::parse(&locator, state.store.bucket())?;
    let object = state.store.get(locator.object()).await?;
    Ok(object.bytes)
}
