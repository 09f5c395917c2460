use std::path::{Path, PathBuf};

/// 已保存的上传图片
///
/// 上传时创建，之后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// 生成的唯一标识
    pub id: String,
    /// 文件保存位置
    pub stored_location: PathBuf,
    /// 客户端提交的原始文件名
    pub original_name: String,
}

impl ImageAsset {
    pub fn new(id: impl Into<String>, stored_location: PathBuf, original_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            stored_location,
            original_name: original_name.into(),
        }
    }

    /// 返回给客户端的文件路径
    pub fn file_path(&self) -> String {
        self.stored_location.to_string_lossy().to_string()
    }

    /// 保存后的文件名（`<id><ext>`）
    pub fn stored_file_name(&self) -> String {
        self.stored_location
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.id.clone())
    }

    pub fn location(&self) -> &Path {
        &self.stored_location
    }
}

/// 描述服务为某张图片生成的描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub text: String,
    pub source_asset_id: String,
}

impl Caption {
    pub fn for_asset(asset: &ImageAsset, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_asset_id: asset.id.clone(),
        }
    }
}

/// 保存并成功生成描述的上传结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionedUpload {
    pub asset: ImageAsset,
    pub caption: Caption,
}
