use serde::{Deserialize, Serialize};
use std::fmt;

/// 审核结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewStatus {
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn from_approved(is_approved: bool) -> Self {
        if is_approved {
            Self::Approved
        } else {
            Self::Rejected
        }
    }

    pub fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一次审核提交的确认记录
///
/// 每次提交生成一条，不会修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDecision {
    pub file_path: String,
    pub approved_caption: String,
    pub status: ReviewStatus,
}

impl ReviewDecision {
    pub fn approved(&self) -> bool {
        self.status.is_approved()
    }
}
