//! 客户端会话状态
//!
//! 持有已选择的图片槽位、各自的描述和审核状态，以及累积的审核历史。
//! 所有修改都经过 `&mut self`，由单个任务驱动，不存在交错追加。

pub mod history;
pub mod slot;

pub use history::{
    HistoryEntry, HistoryExportEntry, ImageDetailEntry, HISTORY_EXPORT_FILE,
    IMAGE_DETAILS_EXPORT_FILE,
};
pub use slot::{ImageSlot, SlotState};

use std::path::Path;
use tracing::debug;

use crate::error::{AppResult, SessionError, StorageError};
use crate::models::ReviewStatus;

/// 会话模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// 只有一个槽位，新选择的文件替换旧槽位
    #[default]
    Single,
    /// 每个文件一个独立槽位
    Multi,
}

/// 槽位编号
///
/// 每次选择文件都会分配新的代数；单图模式替换槽位后，旧编号失效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId {
    index: usize,
    generation: u64,
}

impl SlotId {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// 客户端会话
#[derive(Debug, Default)]
pub struct Session {
    mode: SessionMode,
    slots: Vec<ImageSlot>,
    history: Vec<HistoryEntry>,
    next_generation: u64,
}

impl Session {
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn slots(&self) -> &[ImageSlot] {
        &self.slots
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn slot(&self, id: SlotId) -> AppResult<&ImageSlot> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .ok_or_else(|| SessionError::UnknownSlot { index: id.index }.into())
    }

    /// 选择文件，开始一个新的 Empty → Uploaded 周期
    pub fn select_file(&mut self, file_name: impl Into<String>) -> AppResult<SlotId> {
        let mut slot = ImageSlot::new(file_name);
        slot.state = slot.state.select()?;
        slot.generation = self.next_generation;
        self.next_generation += 1;

        let index = match self.mode {
            SessionMode::Single => {
                self.slots.clear();
                0
            }
            SessionMode::Multi => self.slots.len(),
        };
        let id = SlotId {
            index,
            generation: slot.generation,
        };
        self.slots.push(slot);

        debug!("选择文件，槽位 {} (第 {} 代)", id.index, id.generation);
        Ok(id)
    }

    pub fn begin_caption(&mut self, id: SlotId) -> AppResult<()> {
        self.apply(id, |state| state.begin_caption())
    }

    pub fn caption_ready(&mut self, id: SlotId, caption: &str, file_path: &str) -> AppResult<()> {
        self.apply(id, |state| state.caption_ready(caption, file_path))
    }

    pub fn caption_failed(&mut self, id: SlotId, error: &str) -> AppResult<()> {
        self.apply(id, |state| state.caption_failed(error))
    }

    /// 通过或拒绝，并在同一步追加一条历史
    pub fn decide(&mut self, id: SlotId, is_approved: bool) -> AppResult<&HistoryEntry> {
        let slot = self.slot_mut(id)?;
        let next = slot.state.decide(is_approved)?;

        let entry = HistoryEntry {
            file_name: slot.file_name.clone(),
            file_path: next.file_path().map(str::to_string),
            caption: next.caption().unwrap_or_default().to_string(),
            status: ReviewStatus::from_approved(is_approved),
            decided_at: chrono::Local::now(),
        };

        slot.state = next;
        self.history.push(entry);
        Ok(&self.history[self.history.len() - 1])
    }

    /// `captions-history.json` 的内容
    pub fn export_history(&self) -> AppResult<String> {
        let entries: Vec<HistoryExportEntry> =
            self.history.iter().map(HistoryEntry::to_export).collect();
        to_pretty_json(&entries)
    }

    /// `imageDetails.json` 的内容
    pub fn export_image_details(&self) -> AppResult<String> {
        let entries: Vec<ImageDetailEntry> = self
            .slots
            .iter()
            .map(|slot| ImageDetailEntry {
                file_name: slot.file_name.clone(),
                file_path: slot.state.file_path().map(str::to_string),
                caption: slot.state.caption().map(str::to_string),
                status: slot.state.label().to_string(),
            })
            .collect();
        to_pretty_json(&entries)
    }

    /// 按会话模式选择导出内容并写入文件
    pub async fn save_export(&self, path: &Path) -> AppResult<()> {
        let content = match self.mode {
            SessionMode::Single => self.export_history()?,
            SessionMode::Multi => self.export_image_details()?,
        };
        tokio::fs::write(path, content)
            .await
            .map_err(|source| StorageError::WriteFailed {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(())
    }

    /// 当前模式的默认导出文件名
    pub fn default_export_file(&self) -> &'static str {
        match self.mode {
            SessionMode::Single => HISTORY_EXPORT_FILE,
            SessionMode::Multi => IMAGE_DETAILS_EXPORT_FILE,
        }
    }

    fn apply<F>(&mut self, id: SlotId, transition: F) -> AppResult<()>
    where
        F: FnOnce(&SlotState) -> Result<SlotState, SessionError>,
    {
        let slot = self.slot_mut(id)?;
        slot.state = transition(&slot.state)?;
        Ok(())
    }

    fn slot_mut(&mut self, id: SlotId) -> Result<&mut ImageSlot, SessionError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .ok_or(SessionError::UnknownSlot { index: id.index })
    }
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| {
        SessionError::ExportFailed {
            message: e.to_string(),
        }
        .into()
    })
}
