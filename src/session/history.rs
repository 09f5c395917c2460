//! 审核历史及其 JSON 导出

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::models::ReviewStatus;

/// 单图模式的默认导出文件名
pub const HISTORY_EXPORT_FILE: &str = "captions-history.json";
/// 多图模式的默认导出文件名
pub const IMAGE_DETAILS_EXPORT_FILE: &str = "imageDetails.json";

/// 一条审核历史，追加后不再修改
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub file_name: String,
    pub file_path: Option<String>,
    pub caption: String,
    pub status: ReviewStatus,
    pub decided_at: DateTime<Local>,
}

impl HistoryEntry {
    pub fn to_export(&self) -> HistoryExportEntry {
        HistoryExportEntry {
            file_name: self.file_name.clone(),
            caption: self.caption.clone(),
            status: self.status,
        }
    }
}

/// `captions-history.json` 中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryExportEntry {
    pub file_name: String,
    pub caption: String,
    pub status: ReviewStatus,
}

/// `imageDetails.json` 中的一项，每个槽位一条
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageDetailEntry {
    pub file_name: String,
    pub file_path: Option<String>,
    pub caption: Option<String>,
    pub status: String,
}
