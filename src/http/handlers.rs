use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use tracing::debug;

use super::AppState;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{ReviewDecision, ReviewRequest, UploadResponse};

/// multipart 中图片字段的名称
pub const IMAGE_FIELD: &str = "imageFile";

/// `POST /api/image/upload`
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let mut image: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            debug!("忽略 multipart 字段: {:?}", field.name());
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        image = Some((file_name, bytes.to_vec()));
    }

    let (file_name, bytes) = image.ok_or(ValidationError::MissingField { field: IMAGE_FIELD })?;

    let upload = state
        .upload_flow
        .handle_upload(&bytes, &file_name)
        .await?
        .into_result()?;

    Ok(Json(UploadResponse {
        file_path: upload.asset.file_path(),
        caption: upload.caption.text,
    }))
}

/// 超过大小限制返回 413，其余 multipart 错误视为请求体无效
fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ValidationError::PayloadTooLarge {
            message: e.body_text(),
        }
        .into()
    } else {
        AppError::invalid_body(e.body_text())
    }
}

/// `POST /api/image/review`
pub async fn review_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> AppResult<Json<ReviewDecision>> {
    let Json(request) = payload.map_err(|e| AppError::invalid_body(e.body_text()))?;

    let decision = state.review_recorder.record_review(
        &request.file_path,
        &request.approved_caption,
        request.is_approved,
    )?;

    Ok(Json(decision))
}

/// `GET /healthz`
pub async fn healthz_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
