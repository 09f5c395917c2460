use phf::phf_map;
use std::path::Path;

static IMAGE_CONTENT_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "png" => "image/png",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "bmp" => "image/bmp",
    "tif" => "image/tiff",
    "tiff" => "image/tiff",
    "heic" => "image/heic",
    "svg" => "image/svg+xml",
};

pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// 根据扩展名推断 MIME 类型
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| IMAGE_CONTENT_TYPES.get(ext.to_ascii_lowercase().as_str()))
        .copied()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}
