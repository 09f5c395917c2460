/// 后端 API 客户端
///
/// review 子命令通过它调用 `/api/image/upload` 和 `/api/image/review`
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::error::{ApiError, AppResult, ConfigError, StorageError};
use crate::infrastructure::content_type_for;
use crate::models::{ReviewDecision, ReviewRequest, UploadResponse};

pub const UPLOAD_PATH: &str = "/api/image/upload";
pub const REVIEW_PATH: &str = "/api/image/review";

/// 后端 API 客户端
#[derive(Clone)]
pub struct ReviewApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ReviewApiClient {
    /// 创建新的后端客户端
    ///
    /// 超时比描述服务多留 10 秒，上传请求里包含一次描述调用
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_base_url(
            &config.api_base_url,
            Duration::from_secs(config.caption_timeout_secs + 10),
        )
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 上传图片并取得描述
    pub async fn upload_image(&self, path: &Path) -> AppResult<UploadResponse> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| StorageError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        self.upload_bytes(bytes, &file_name).await
    }

    /// 上传内存中的图片字节
    pub async fn upload_bytes(&self, bytes: Vec<u8>, file_name: &str) -> AppResult<UploadResponse> {
        let endpoint = format!("{}{}", self.base_url, UPLOAD_PATH);
        debug!("上传图片: {} ({} 字节)", file_name, bytes.len());

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type_for(Path::new(file_name)))
            .map_err(|source| ApiError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;
        let form = Form::new().part("imageFile", part);

        let response = self
            .http
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;

        decode(endpoint, response).await
    }

    /// 提交审核结果
    pub async fn review(
        &self,
        file_path: &str,
        caption: &str,
        is_approved: bool,
    ) -> AppResult<ReviewDecision> {
        let endpoint = format!("{}{}", self.base_url, REVIEW_PATH);
        let request = ReviewRequest {
            file_path: file_path.to_string(),
            approved_caption: caption.to_string(),
            is_approved,
        };

        let response = self
            .http
            .post(&endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|source| ApiError::RequestFailed {
                endpoint: endpoint.clone(),
                source,
            })?;

        decode(endpoint, response).await
    }
}

async fn decode<T: DeserializeOwned>(endpoint: String, response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::BadStatus {
            endpoint,
            status: status.as_u16(),
            body,
        }
        .into());
    }

    let value = response
        .json::<T>()
        .await
        .map_err(|source| ApiError::DecodeFailed { endpoint, source })?;
    Ok(value)
}
