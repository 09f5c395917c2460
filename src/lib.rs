//! # Caption Review
//!
//! 上传图片、调用第三方服务生成描述、人工通过/拒绝并保留审核历史
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有磁盘目录，只暴露"保存图片"能力
//! - `UploadStore` - 以 `<uuid><扩展名>` 保存上传文件
//!
//! ### ② 业务能力层（Clients / Services）
//! - `clients/` - 与外部系统交互：描述服务、视觉模型、后端 API
//! - `ReviewRecorder` - 把审核决定转换为确认记录
//!
//! ### ③ 流程层（Workflow / Session）
//! - `workflow/` - 定义"一次上传"的流程（保存 → 描述）
//! - `session/` - 客户端会话状态机和审核历史
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/server` - 服务端生命周期
//! - `orchestrator/review_runner` - 客户端审核会话
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod http;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod session;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CaptionClient, CaptionProvider, ReviewApiClient, VisionCaptionClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use http::{build_router, AppState};
pub use infrastructure::{ImageStore, UploadStore};
pub use models::{Caption, ImageAsset, ReviewDecision, ReviewStatus};
pub use orchestrator::{App, DecisionPolicy, ReviewRunner};
pub use services::ReviewRecorder;
pub use session::{Session, SessionMode, SlotState};
pub use workflow::{UploadFlow, UploadOutcome};
