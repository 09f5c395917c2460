//! 审核记录服务 - 业务能力层
//!
//! 只负责把"通过/拒绝"转换成确认记录，不做持久化

use tracing::info;

use crate::error::{AppResult, ValidationError};
use crate::models::{ReviewDecision, ReviewStatus};

/// 审核记录服务
///
/// 职责：
/// - 校验文件路径
/// - 根据 `is_approved` 生成 Approved / Rejected
/// - 不去重，同样的请求提交两次得到两条独立记录
#[derive(Debug, Clone, Default)]
pub struct ReviewRecorder;

impl ReviewRecorder {
    pub fn new() -> Self {
        Self
    }

    /// 记录一次审核
    pub fn record_review(
        &self,
        location: &str,
        caption_text: &str,
        is_approved: bool,
    ) -> AppResult<ReviewDecision> {
        if location.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "filePath" }.into());
        }

        let decision = ReviewDecision {
            file_path: location.to_string(),
            approved_caption: caption_text.to_string(),
            status: ReviewStatus::from_approved(is_approved),
        };

        info!("📝 审核结果: {} -> {}", decision.file_path, decision.status);
        Ok(decision)
    }
}
