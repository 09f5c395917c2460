/// 图片描述服务客户端
///
/// 把已保存的图片以 multipart 方式提交到 `<base_url>/generate-caption`，
/// 响应体即为描述文本。只请求一次，不重试。
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::{debug, warn};

use super::CaptionProvider;
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, ProviderError};
use crate::infrastructure::{content_type_for, read_asset};
use crate::models::ImageAsset;

pub const GENERATE_CAPTION_PATH: &str = "/generate-caption";

/// multipart 图片描述客户端
pub struct CaptionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl CaptionClient {
    /// 创建新的描述服务客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_base_url(
            &config.caption_api_base_url,
            Duration::from_secs(config.caption_timeout_secs),
        )
    }

    /// 指定服务地址和超时
    pub fn with_base_url(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATE_CAPTION_PATH),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CaptionProvider for CaptionClient {
    async fn request_caption(&self, asset: &ImageAsset) -> AppResult<String> {
        let bytes = read_asset(asset).await?;
        let file_name = asset.stored_file_name();

        debug!(
            "正在请求图片描述: {} -> {} ({} 字节)",
            file_name,
            self.endpoint,
            bytes.len()
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type_for(asset.location()))
            .map_err(|e| ProviderError::InvalidRequest {
                reason: e.to_string(),
            })?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("描述服务请求失败: {}", e);
                AppError::provider_unavailable(&self.endpoint, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("描述服务返回错误状态: {}", status);
            return Err(AppError::provider_unavailable(
                &self.endpoint,
                format!("HTTP {}", status),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::provider_unavailable(&self.endpoint, e))?;
        let text = String::from_utf8(body.to_vec())
            .map_err(|e| AppError::provider_bad_response(&self.endpoint, e))?;

        let caption = parse_caption(&text)
            .map_err(|reason| AppError::provider_bad_response(&self.endpoint, reason))?;

        debug!("描述服务调用成功");
        Ok(caption)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// 解析描述服务的响应体
///
/// 纯文本直接使用；JSON 字符串或带 `caption` 字段的 JSON 对象取其值
pub(crate) fn parse_caption(body: &str) -> Result<String, String> {
    let trimmed = body.trim();

    let caption = if trimmed.starts_with('{') || trimmed.starts_with('"') {
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(serde_json::Value::String(s)) => s,
            Ok(serde_json::Value::Object(map)) => map
                .get("caption")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| "JSON 响应缺少 caption 字段".to_string())?,
            // 不是合法 JSON 时当作纯文本
            Ok(_) | Err(_) => trimmed.to_string(),
        }
    } else {
        trimmed.to_string()
    };

    let caption = caption.trim();
    if caption.is_empty() {
        return Err("描述内容为空".to_string());
    }
    Ok(caption.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{ImageStore, UploadStore};
    use axum::extract::Multipart;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::Router;
    use std::net::SocketAddr;

    #[test]
    fn test_parse_caption_plain_text() {
        assert_eq!(
            parse_caption("  A cat sitting on a windowsill\n").unwrap(),
            "A cat sitting on a windowsill"
        );
    }

    #[test]
    fn test_parse_caption_json() {
        assert_eq!(parse_caption(r#""A dog""#).unwrap(), "A dog");
        assert_eq!(parse_caption(r#"{"caption": "A bird"}"#).unwrap(), "A bird");
        assert!(parse_caption(r#"{"text": "A bird"}"#).is_err());
    }

    #[test]
    fn test_parse_caption_empty() {
        assert!(parse_caption("").is_err());
        assert!(parse_caption("   \n").is_err());
        assert!(parse_caption(r#""""#).is_err());
    }

    async fn spawn_provider(status: StatusCode, body: &'static str) -> SocketAddr {
        let app = Router::new().route(
            GENERATE_CAPTION_PATH,
            post(move |mut multipart: Multipart| async move {
                let mut saw_file = false;
                while let Ok(Some(field)) = multipart.next_field().await {
                    if field.name() == Some("file") {
                        saw_file = field.bytes().await.map(|b| !b.is_empty()).unwrap_or(false);
                    }
                }
                if saw_file {
                    (status, body)
                } else {
                    (StatusCode::BAD_REQUEST, "missing file")
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn stored_asset(dir: &std::path::Path) -> ImageAsset {
        UploadStore::new(dir).store(b"0123456789", "cat.jpg").await.unwrap()
    }

    #[tokio::test]
    async fn test_request_caption_success() {
        let addr = spawn_provider(StatusCode::OK, "A cat sitting on a windowsill").await;
        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let client =
            CaptionClient::with_base_url(&format!("http://{}/", addr), Duration::from_secs(5)).unwrap();
        assert_eq!(client.endpoint(), format!("http://{}/generate-caption", addr));

        let caption = client.request_caption(&asset).await.unwrap();
        assert_eq!(caption, "A cat sitting on a windowsill");
    }

    #[tokio::test]
    async fn test_request_caption_non_success_is_unavailable() {
        let addr = spawn_provider(StatusCode::SERVICE_UNAVAILABLE, "busy").await;
        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let client =
            CaptionClient::with_base_url(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = client.request_caption(&asset).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_request_caption_empty_body_is_bad_response() {
        let addr = spawn_provider(StatusCode::OK, "   ").await;
        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let client =
            CaptionClient::with_base_url(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = client.request_caption(&asset).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::BadResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_request_caption_unreachable() {
        // 绑定后立即释放，得到一个没有监听的端口
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let client =
            CaptionClient::with_base_url(&format!("http://{}", addr), Duration::from_secs(2)).unwrap();
        let err = client.request_caption(&asset).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_request_caption_timeout_is_unavailable() {
        let app = Router::new().route(
            GENERATE_CAPTION_PATH,
            post(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "too late"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let client =
            CaptionClient::with_base_url(&format!("http://{}", addr), Duration::from_millis(500))
                .unwrap();
        let err = client.request_caption(&asset).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_request_caption_non_utf8_is_bad_response() {
        let app = Router::new().route(
            GENERATE_CAPTION_PATH,
            post(|| async { vec![0xffu8, 0xfe] }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let client =
            CaptionClient::with_base_url(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let err = client.request_caption(&asset).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::BadResponse { .. })
        ));
    }
}
