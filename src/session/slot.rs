//! 单个图片槽位的状态机
//!
//! ```text
//! Empty → Uploaded → CaptionPending → CaptionReady → Decided(Approved|Rejected)
//!             ↑            │
//!             └── 失败 ────┘
//! ```
//!
//! 每个转换都是纯函数：读取当前状态，返回新状态或错误，不修改自身。

use crate::error::SessionError;
use crate::models::ReviewStatus;

/// 槽位状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SlotState {
    #[default]
    Empty,
    /// 已选择文件；`last_error` 为上一次描述失败的原因
    Uploaded { last_error: Option<String> },
    CaptionPending,
    CaptionReady { caption: String, file_path: String },
    Decided {
        caption: String,
        file_path: String,
        status: ReviewStatus,
    },
}

impl SlotState {
    pub fn label(&self) -> &'static str {
        match self {
            SlotState::Empty => "Empty",
            SlotState::Uploaded { .. } => "Uploaded",
            SlotState::CaptionPending => "CaptionPending",
            SlotState::CaptionReady { .. } => "CaptionReady",
            SlotState::Decided { status, .. } => status.as_str(),
        }
    }

    pub fn caption(&self) -> Option<&str> {
        match self {
            SlotState::CaptionReady { caption, .. } | SlotState::Decided { caption, .. } => {
                Some(caption)
            }
            _ => None,
        }
    }

    pub fn file_path(&self) -> Option<&str> {
        match self {
            SlotState::CaptionReady { file_path, .. } | SlotState::Decided { file_path, .. } => {
                Some(file_path)
            }
            _ => None,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            SlotState::Uploaded { last_error } => last_error.as_deref(),
            _ => None,
        }
    }

    /// 选择文件
    pub fn select(&self) -> Result<SlotState, SessionError> {
        match self {
            SlotState::Empty => Ok(SlotState::Uploaded { last_error: None }),
            other => Err(other.reject("select")),
        }
    }

    /// 开始请求描述
    pub fn begin_caption(&self) -> Result<SlotState, SessionError> {
        match self {
            SlotState::Uploaded { .. } => Ok(SlotState::CaptionPending),
            other => Err(other.reject("begin_caption")),
        }
    }

    /// 描述返回
    pub fn caption_ready(
        &self,
        caption: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Result<SlotState, SessionError> {
        match self {
            SlotState::CaptionPending => Ok(SlotState::CaptionReady {
                caption: caption.into(),
                file_path: file_path.into(),
            }),
            other => Err(other.reject("caption_ready")),
        }
    }

    /// 描述失败，回到 Uploaded，可再次请求
    pub fn caption_failed(&self, error: impl Into<String>) -> Result<SlotState, SessionError> {
        match self {
            SlotState::CaptionPending => Ok(SlotState::Uploaded {
                last_error: Some(error.into()),
            }),
            other => Err(other.reject("caption_failed")),
        }
    }

    /// 通过或拒绝
    pub fn decide(&self, is_approved: bool) -> Result<SlotState, SessionError> {
        match self {
            SlotState::CaptionReady { caption, file_path } => Ok(SlotState::Decided {
                caption: caption.clone(),
                file_path: file_path.clone(),
                status: ReviewStatus::from_approved(is_approved),
            }),
            other => Err(other.reject("decide")),
        }
    }

    fn reject(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            from: self.label(),
            action,
        }
    }
}

/// 一个图片槽位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    /// 用户选择的文件名
    pub file_name: String,
    pub state: SlotState,
    pub(super) generation: u64,
}

impl ImageSlot {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            state: SlotState::Empty,
            generation: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> SlotState {
        SlotState::Empty
            .select()
            .and_then(|s| s.begin_caption())
            .and_then(|s| s.caption_ready("A cat", "Uploads/a.jpg"))
            .unwrap()
    }

    #[test]
    fn test_happy_path() {
        let state = ready();
        assert_eq!(state.label(), "CaptionReady");
        assert_eq!(state.caption(), Some("A cat"));

        let decided = state.decide(true).unwrap();
        assert_eq!(decided.label(), "Approved");
        assert!(matches!(decided, SlotState::Decided { .. }));
        assert_eq!(decided.file_path(), Some("Uploads/a.jpg"));

        assert_eq!(state.decide(false).unwrap().label(), "Rejected");
    }

    #[test]
    fn test_failure_returns_to_uploaded() {
        let pending = SlotState::Empty.select().unwrap().begin_caption().unwrap();
        let failed = pending.caption_failed("HTTP 500").unwrap();

        assert_eq!(failed.label(), "Uploaded");
        assert_eq!(failed.last_error(), Some("HTTP 500"));
        assert_eq!(failed.caption(), None);
        // 可以再次请求
        assert_eq!(failed.begin_caption().unwrap(), SlotState::CaptionPending);
    }

    #[test]
    fn test_decide_requires_caption() {
        let uploaded = SlotState::Empty.select().unwrap();
        assert_eq!(
            uploaded.decide(true),
            Err(SessionError::InvalidTransition {
                from: "Uploaded",
                action: "decide"
            })
        );
        assert!(SlotState::CaptionPending.decide(true).is_err());
        assert!(SlotState::Empty.decide(false).is_err());
    }

    #[test]
    fn test_decided_is_terminal() {
        let decided = ready().decide(true).unwrap();
        assert!(decided.decide(false).is_err());
        assert!(decided.begin_caption().is_err());
        assert!(decided.select().is_err());
    }
}
