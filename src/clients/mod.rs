pub mod api_client;
pub mod caption_client;
pub mod vision_client;

pub use api_client::ReviewApiClient;
pub use caption_client::CaptionClient;
pub use vision_client::VisionCaptionClient;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::config::{CaptionProviderKind, Config};
use crate::error::AppResult;
use crate::models::ImageAsset;

/// 图片描述能力
///
/// 一次调用只发一次请求，失败直接返回，是否重试由调用方决定
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    async fn request_caption(&self, asset: &ImageAsset) -> AppResult<String>;

    /// 用于日志的服务名
    fn name(&self) -> &str;
}

/// 按配置创建描述服务
pub fn build_caption_provider(config: &Config) -> AppResult<Arc<dyn CaptionProvider>> {
    let provider: Arc<dyn CaptionProvider> = match config.caption_provider {
        CaptionProviderKind::Http => Arc::new(CaptionClient::new(config)?),
        CaptionProviderKind::Vision => Arc::new(VisionCaptionClient::new(config)?),
    };
    info!("🤖 图片描述服务: {}", provider.name());
    Ok(provider)
}
