//! 上传处理流程 - 流程层
//!
//! 核心职责：定义"一次上传"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验（空上传直接拒绝）
//! 2. 保存图片
//! 3. 请求描述
//!
//! 保存成功但描述失败时不回滚，文件保留在上传目录，
//! 结果为 `UploadOutcome::StoredButUncaptioned`。

use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::CaptionProvider;
use crate::error::{AppError, AppResult, ValidationError};
use crate::infrastructure::ImageStore;
use crate::models::{Caption, CaptionedUpload, ImageAsset};
use crate::utils::logging::truncate_text;

/// 上传处理结果
#[derive(Debug)]
pub enum UploadOutcome {
    /// 保存并生成描述
    Captioned(CaptionedUpload),
    /// 已保存，描述失败
    StoredButUncaptioned { asset: ImageAsset, error: AppError },
}

impl UploadOutcome {
    pub fn asset(&self) -> &ImageAsset {
        match self {
            UploadOutcome::Captioned(upload) => &upload.asset,
            UploadOutcome::StoredButUncaptioned { asset, .. } => asset,
        }
    }

    pub fn is_captioned(&self) -> bool {
        matches!(self, UploadOutcome::Captioned(_))
    }

    /// 部分成功按描述失败处理
    pub fn into_result(self) -> AppResult<CaptionedUpload> {
        match self {
            UploadOutcome::Captioned(upload) => Ok(upload),
            UploadOutcome::StoredButUncaptioned { error, .. } => Err(error),
        }
    }
}

/// 上传处理流程
///
/// - 编排"保存 → 描述"两步
/// - 两步严格顺序执行，每次保存成功只请求一次描述
/// - 不持有可变状态，多个上传可并发调用
pub struct UploadFlow {
    store: Arc<dyn ImageStore>,
    provider: Arc<dyn CaptionProvider>,
}

impl UploadFlow {
    /// 创建新的上传流程
    pub fn new(store: Arc<dyn ImageStore>, provider: Arc<dyn CaptionProvider>) -> Self {
        Self { store, provider }
    }

    pub async fn handle_upload(&self, bytes: &[u8], filename: &str) -> AppResult<UploadOutcome> {
        if bytes.is_empty() {
            warn!("⚠️ 空上传: {}", filename);
            return Err(ValidationError::EmptyUpload.into());
        }

        info!("📤 收到上传: {} ({} 字节)", filename, bytes.len());

        let asset = self.store.store(bytes, filename).await?;

        match self.provider.request_caption(&asset).await {
            Ok(text) => {
                info!(
                    "✓ 描述生成成功 [{}]: {}",
                    asset.stored_file_name(),
                    truncate_text(&text, 80)
                );
                let caption = Caption::for_asset(&asset, text);
                Ok(UploadOutcome::Captioned(CaptionedUpload { asset, caption }))
            }
            Err(error) => {
                warn!(
                    "⚠️ 图片已保存但描述失败，文件保留: {} ({})",
                    asset.file_path(),
                    error
                );
                Ok(UploadOutcome::StoredButUncaptioned { asset, error })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ProviderError, StorageError};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    #[derive(Default)]
    struct CountingStore {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ImageStore for CountingStore {
        async fn store(&self, _bytes: &[u8], original_name: &str) -> AppResult<ImageAsset> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StorageError::WriteFailed {
                    path: PathBuf::from("Uploads"),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                }
                .into());
            }
            Ok(ImageAsset::new(
                format!("id-{}", n),
                PathBuf::from(format!("Uploads/id-{}.jpg", n)),
                original_name,
            ))
        }
    }

    struct CountingProvider {
        calls: AtomicUsize,
        reply: Option<&'static str>,
    }

    impl CountingProvider {
        fn replying(reply: &'static str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: Some(reply),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: None,
            }
        }
    }

    #[async_trait]
    impl CaptionProvider for CountingProvider {
        async fn request_caption(&self, _asset: &ImageAsset) -> AppResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.reply {
                Some(text) => Ok(text.to_string()),
                None => Err(AppError::provider_unavailable("/generate-caption", "HTTP 500")),
            }
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn flow(store: &Arc<CountingStore>, provider: &Arc<CountingProvider>) -> UploadFlow {
        UploadFlow::new(store.clone(), provider.clone())
    }

    #[tokio::test]
    async fn test_non_empty_upload_requests_one_caption() {
        let store = Arc::new(CountingStore::default());
        let provider = Arc::new(CountingProvider::replying("A cat sitting on a windowsill"));

        let outcome = assert_ok!(flow(&store, &provider).handle_upload(b"0123456789", "cat.jpg").await);
        assert!(outcome.is_captioned());

        let upload = assert_ok!(outcome.into_result());
        assert_eq!(upload.caption.text, "A cat sitting on a windowsill");
        assert_eq!(upload.caption.source_asset_id, upload.asset.id);
        assert_eq!(upload.asset.file_path(), "Uploads/id-0.jpg");

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_upload_touches_nothing() {
        let store = Arc::new(CountingStore::default());
        let provider = Arc::new(CountingProvider::replying("unused"));

        let err = assert_err!(flow(&store, &provider).handle_upload(b"", "cat.jpg").await);
        assert!(matches!(err, AppError::Validation(ValidationError::EmptyUpload)));

        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_stored_asset() {
        let store = Arc::new(CountingStore::default());
        let provider = Arc::new(CountingProvider::failing());

        let outcome = assert_ok!(flow(&store, &provider).handle_upload(b"abc", "cat.jpg").await);
        assert!(!outcome.is_captioned());
        assert_eq!(outcome.asset().file_path(), "Uploads/id-0.jpg");

        let err = assert_err!(outcome.into_result());
        assert!(matches!(
            err,
            AppError::Provider(ProviderError::Unavailable { .. })
        ));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_skips_provider() {
        let store = Arc::new(CountingStore {
            fail: true,
            ..Default::default()
        });
        let provider = Arc::new(CountingProvider::replying("unused"));

        let err = assert_err!(flow(&store, &provider).handle_upload(b"abc", "cat.jpg").await);
        assert!(matches!(err, AppError::Storage(_)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
