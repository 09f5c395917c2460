//! 上传文件存储
//!
//! 只负责"把字节写到磁盘并返回位置"，不关心描述和审核

use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppResult, StorageError};
use crate::models::ImageAsset;

static SAFE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{1,10}$").expect("扩展名正则无效"));

/// 图片存储能力
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// 以唯一文件名保存图片，保留原扩展名
    async fn store(&self, bytes: &[u8], original_name: &str) -> AppResult<ImageAsset>;
}

/// 本地目录存储
///
/// 文件名为 `<uuid><原扩展名>`，以 create-new 方式写入，不会覆盖已有文件。
/// 没有清理策略，文件会一直保留。
#[derive(Debug, Clone)]
pub struct UploadStore {
    upload_dir: PathBuf,
}

impl UploadStore {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    async fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|source| StorageError::CreateDirFailed {
                path: self.upload_dir.clone(),
                source,
            })?;
        Ok(())
    }
}

#[async_trait]
impl ImageStore for UploadStore {
    async fn store(&self, bytes: &[u8], original_name: &str) -> AppResult<ImageAsset> {
        self.ensure_dir().await?;

        let id = Uuid::new_v4().to_string();
        let file_name = format!("{}{}", id, preserved_extension(original_name));
        let path = self.upload_dir.join(&file_name);

        debug!("写入上传文件: {} ({} 字节)", path.display(), bytes.len());

        let file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: path.clone(),
                source,
            })?;
        write_or_discard(file, bytes, &path).await?;

        info!("✓ 已保存上传图片 {} -> {}", original_name, path.display());

        Ok(ImageAsset::new(id, path, original_name))
    }
}

/// 写入并刷新；失败时删除已创建的文件，不留下不完整的图片
async fn write_or_discard<W>(mut writer: W, bytes: &[u8], path: &Path) -> AppResult<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;
    drop(writer);

    if let Err(source) = written {
        if let Err(e) = fs::remove_file(path).await {
            warn!("清理未写完的文件失败 ({}): {}", path.display(), e);
        }
        return Err(StorageError::WriteFailed {
            path: path.to_path_buf(),
            source,
        }
        .into());
    }
    Ok(())
}

/// 读取已保存的图片
pub async fn read_asset(asset: &ImageAsset) -> AppResult<Vec<u8>> {
    let bytes = fs::read(asset.location())
        .await
        .map_err(|source| StorageError::ReadFailed {
            path: asset.stored_location.clone(),
            source,
        })?;
    Ok(bytes)
}

/// 原文件的扩展名（含点号），不安全的扩展名直接丢弃
fn preserved_extension(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| SAFE_EXTENSION.is_match(ext))
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default()
}
