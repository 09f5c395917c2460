//! 审核会话驱动
//!
//! 对每张图片：选择 → 上传并取得描述 → 通过/拒绝 → 后端确认 → 写入历史。
//! 描述失败时槽位回到 Uploaded，继续处理下一张，不自动重试。

use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info, warn};

use crate::clients::ReviewApiClient;
use crate::error::{AppResult, StorageError};
use crate::session::{Session, SessionMode, SlotId};
use crate::utils::logging::{print_review_stats, truncate_text};

/// 审核决定的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionPolicy {
    /// 从标准输入读取 y/n
    Interactive,
    ApproveAll,
    RejectAll,
}

/// 审核统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReviewStats {
    pub approved: usize,
    pub rejected: usize,
    pub failed: usize,
    pub total: usize,
}

/// 审核会话驱动
pub struct ReviewRunner {
    client: ReviewApiClient,
    session: Session,
    policy: DecisionPolicy,
    stdin: Option<Lines<BufReader<Stdin>>>,
}

impl ReviewRunner {
    pub fn new(client: ReviewApiClient, mode: SessionMode, policy: DecisionPolicy) -> Self {
        let stdin = (policy == DecisionPolicy::Interactive)
            .then(|| BufReader::new(tokio::io::stdin()).lines());
        Self {
            client,
            session: Session::new(mode),
            policy,
            stdin,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 依次处理所有图片
    pub async fn run(&mut self, images: &[PathBuf]) -> AppResult<ReviewStats> {
        let mut stats = ReviewStats {
            total: images.len(),
            ..Default::default()
        };

        for (index, path) in images.iter().enumerate() {
            info!("\n[图片 {}/{}] {}", index + 1, images.len(), path.display());

            let Some((id, caption)) = self.caption_image(path).await? else {
                stats.failed += 1;
                continue;
            };

            let Some(is_approved) = self.ask_decision(&caption).await? else {
                info!("跳过，未做决定");
                continue;
            };

            match self.submit_decision(id, is_approved).await {
                Ok(()) if is_approved => stats.approved += 1,
                Ok(()) => stats.rejected += 1,
                Err(e) => error!("❌ 审核提交失败: {}", e),
            }
        }

        print_review_stats(stats.approved, stats.rejected, stats.failed, stats.total);
        Ok(stats)
    }

    /// 导出历史
    pub async fn export(&self, path: Option<&Path>) -> AppResult<PathBuf> {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(self.session.default_export_file()));
        self.session.save_export(&path).await?;
        info!("💾 历史已导出: {}", path.display());
        Ok(path)
    }

    /// 上传一张图片并取得描述；描述失败返回 None
    async fn caption_image(&mut self, path: &Path) -> AppResult<Option<(SlotId, String)>> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let id = self.session.select_file(file_name)?;
        self.session.begin_caption(id)?;

        match self.client.upload_image(path).await {
            Ok(response) => {
                self.session
                    .caption_ready(id, &response.caption, &response.file_path)?;
                info!("📝 描述: {}", truncate_text(&response.caption, 120));
                Ok(Some((id, response.caption)))
            }
            Err(e) => {
                // 存储失败和描述失败对用户一视同仁
                warn!("⚠️ 未能生成描述，可稍后重试: {}", e);
                self.session.caption_failed(id, "未能生成描述")?;
                Ok(None)
            }
        }
    }

    async fn ask_decision(&mut self, caption: &str) -> AppResult<Option<bool>> {
        match self.policy {
            DecisionPolicy::ApproveAll => Ok(Some(true)),
            DecisionPolicy::RejectAll => Ok(Some(false)),
            DecisionPolicy::Interactive => {
                let Some(lines) = self.stdin.as_mut() else {
                    return Ok(None);
                };
                loop {
                    println!("描述: {}\n通过? [y/n/s(跳过)]", caption);
                    let line = lines
                        .next_line()
                        .await
                        .map_err(|source| StorageError::ReadFailed {
                            path: PathBuf::from("<stdin>"),
                            source,
                        })?;
                    match line.as_deref().map(parse_answer) {
                        Some(Some(answer)) => return Ok(answer),
                        Some(None) => continue,
                        // 输入结束
                        None => return Ok(None),
                    }
                }
            }
        }
    }

    /// 后端确认后再写入会话历史
    async fn submit_decision(&mut self, id: SlotId, is_approved: bool) -> AppResult<()> {
        let slot = self.session.slot(id)?;
        let caption = slot.state.caption().unwrap_or_default().to_string();
        let file_path = slot.state.file_path().unwrap_or_default().to_string();

        let decision = self.client.review(&file_path, &caption, is_approved).await?;
        let entry = self.session.decide(id, decision.approved())?;
        info!(
            "✓ {} -> {} ({})",
            entry.file_name,
            entry.status,
            entry.decided_at.format("%H:%M:%S")
        );
        Ok(())
    }
}

/// y → 通过，n → 拒绝，s → 跳过；其他输入返回 None 需要重新询问
fn parse_answer(input: &str) -> Option<Option<bool>> {
    match input.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(Some(true)),
        "n" | "no" => Some(Some(false)),
        "s" | "skip" => Some(None),
        _ => None,
    }
}
