//! 视觉模型描述客户端
//!
//! 通过 OpenAI 兼容的 chat completion 接口生成图片描述。
//! 图片以 base64 `data:` URL 的形式随用户消息发送。
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs, ImageDetail,
        ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use super::CaptionProvider;
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError, ProviderError};
use crate::infrastructure::{content_type_for, read_asset};
use crate::models::ImageAsset;

const SYSTEM_PROMPT: &str =
    "You write short, factual image captions. Reply with a single sentence and nothing else.";
const USER_PROMPT: &str = "Describe this image in one sentence.";

/// 视觉模型描述客户端
pub struct VisionCaptionClient {
    client: Client<OpenAIConfig>,
    model_name: String,
    timeout: Duration,
}

impl VisionCaptionClient {
    /// 创建新的视觉模型客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        if config.vision_api_key.trim().is_empty() {
            return Err(ConfigError::Missing {
                name: "vision_api_key",
            }
            .into());
        }

        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.vision_api_key)
            .with_api_base(&config.vision_api_base_url);

        Ok(Self {
            client: Client::with_config(openai_config),
            model_name: config.vision_model_name.clone(),
            timeout: Duration::from_secs(config.caption_timeout_secs),
        })
    }

    fn build_messages(&self, image_url: String) -> Result<Vec<ChatCompletionRequestMessage>, ProviderError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()
            .map_err(invalid_request)?;

        let content_parts = vec![
            ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartText {
                    text: USER_PROMPT.to_string(),
                },
            ),
            ChatCompletionRequestUserMessageContentPart::ImageUrl(
                ChatCompletionRequestMessageContentPartImage {
                    image_url: ImageUrl {
                        url: image_url,
                        detail: Some(ImageDetail::Auto),
                    },
                },
            ),
        ];

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()
            .map_err(invalid_request)?;

        Ok(vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ])
    }
}

#[async_trait]
impl CaptionProvider for VisionCaptionClient {
    async fn request_caption(&self, asset: &ImageAsset) -> AppResult<String> {
        let bytes = read_asset(asset).await?;
        debug!(
            "调用视觉模型生成描述，模型: {}，图片 {} 字节",
            self.model_name,
            bytes.len()
        );

        let messages = self.build_messages(data_url(asset.location(), &bytes))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.3)
            .max_tokens(256u32)
            .build()
            .map_err(invalid_request)?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| AppError::provider_unavailable(&self.model_name, "请求超时"))?
            .map_err(|e| {
                warn!("视觉模型调用失败: {}", e);
                AppError::provider_unavailable(&self.model_name, e)
            })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::provider_bad_response(&self.model_name, "返回内容为空"))?;

        debug!("视觉模型调用成功");
        Ok(content)
    }

    fn name(&self) -> &str {
        "vision"
    }
}

fn invalid_request(e: impl std::fmt::Display) -> ProviderError {
    ProviderError::InvalidRequest {
        reason: e.to_string(),
    }
}

/// 图片字节编码为 `data:` URL
fn data_url(path: &Path, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type_for(path), STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{ImageStore, UploadStore};
    use axum::http::{header, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use std::net::SocketAddr;

    const EMPTY_COMPLETION: &str = r#"{
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 0,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "   "},
            "finish_reason": "stop"
        }]
    }"#;

    const CAPTION_COMPLETION: &str = r#"{
        "id": "chatcmpl-2",
        "object": "chat.completion",
        "created": 0,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": " A cat sitting on a windowsill "},
            "finish_reason": "stop"
        }]
    }"#;

    const API_ERROR: &str = r#"{"error": {"message": "invalid api key", "type": "invalid_request_error", "param": null, "code": null}}"#;

    async fn spawn_chat_api(status: StatusCode, body: &'static str) -> SocketAddr {
        let app = Router::new().route(
            "/chat/completions",
            post(move || async move { (status, [(header::CONTENT_TYPE, "application/json")], body) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn client_for(addr: SocketAddr, timeout_secs: u64) -> VisionCaptionClient {
        let config = Config {
            vision_api_key: "test-key".to_string(),
            vision_api_base_url: format!("http://{}", addr),
            caption_timeout_secs: timeout_secs,
            ..Config::default()
        };
        VisionCaptionClient::new(&config).unwrap()
    }

    async fn stored_asset(dir: &Path) -> ImageAsset {
        UploadStore::new(dir).store(b"0123456789", "cat.png").await.unwrap()
    }

    #[tokio::test]
    async fn test_vision_caption_success() {
        let addr = spawn_chat_api(StatusCode::OK, CAPTION_COMPLETION).await;
        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let caption = client_for(addr, 5).request_caption(&asset).await.unwrap();
        assert_eq!(caption, "A cat sitting on a windowsill");
    }

    #[tokio::test]
    async fn test_vision_api_error_is_unavailable() {
        let addr = spawn_chat_api(StatusCode::UNAUTHORIZED, API_ERROR).await;
        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let err = client_for(addr, 5).request_caption(&asset).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_vision_server_error_times_out_as_unavailable() {
        // 5xx 会被客户端退避重试，直到超时
        let addr = spawn_chat_api(StatusCode::SERVICE_UNAVAILABLE, API_ERROR).await;
        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let err = client_for(addr, 1).request_caption(&asset).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::Unavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_vision_empty_content_is_bad_response() {
        let addr = spawn_chat_api(StatusCode::OK, EMPTY_COMPLETION).await;
        let dir = tempfile::tempdir().unwrap();
        let asset = stored_asset(dir.path()).await;

        let err = client_for(addr, 5).request_caption(&asset).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::BadResponse { .. })
        ));
    }

    #[test]
    fn test_data_url() {
        let url = data_url(Path::new("Uploads/x.png"), b"abc");
        assert_eq!(url, "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = Config::default();
        assert!(matches!(
            VisionCaptionClient::new(&config),
            Err(AppError::Config(ConfigError::Missing { .. }))
        ));
    }

    #[test]
    fn test_build_messages() {
        let config = Config {
            vision_api_key: "test-key".to_string(),
            ..Config::default()
        };
        let client = VisionCaptionClient::new(&config).unwrap();
        let messages = client
            .build_messages("data:image/png;base64,YWJj".to_string())
            .unwrap();
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(messages[1], ChatCompletionRequestMessage::User(_)));
    }
}
