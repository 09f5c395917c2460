//! HTTP 接口层
//!
//! - `POST /api/image/upload`：上传图片并返回描述
//! - `POST /api/image/review`：提交审核结果
//! - `GET /healthz`：健康检查

pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::clients::CaptionProvider;
use crate::infrastructure::ImageStore;
use crate::services::ReviewRecorder;
use crate::workflow::UploadFlow;

/// 各个请求共享的服务
#[derive(Clone)]
pub struct AppState {
    pub upload_flow: Arc<UploadFlow>,
    pub review_recorder: ReviewRecorder,
}

impl AppState {
    pub fn new(store: Arc<dyn ImageStore>, provider: Arc<dyn CaptionProvider>) -> Self {
        Self {
            upload_flow: Arc::new(UploadFlow::new(store, provider)),
            review_recorder: ReviewRecorder::new(),
        }
    }
}

/// 构建路由
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/api/image/upload", post(handlers::upload_handler))
        .route("/api/image/review", post(handlers::review_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
