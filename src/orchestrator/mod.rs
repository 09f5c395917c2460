//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `server` - 服务端应用
//! - 管理服务生命周期（初始化、监听、优雅退出）
//! - 组装存储、描述服务和路由
//!
//! ### `review_runner` - 审核会话驱动
//! - 遍历待审核的图片
//! - 调用后端接口上传、审核
//! - 维护客户端会话状态并导出历史
//!
//! ## 层次关系
//!
//! ```text
//! server ── http (路由) ── workflow::UploadFlow ── infrastructure / clients
//!                      └── services::ReviewRecorder
//!
//! review_runner ── clients::ReviewApiClient ── (HTTP) ── server
//!              └── session::Session
//! ```

pub mod review_runner;
pub mod server;

pub use review_runner::{DecisionPolicy, ReviewRunner, ReviewStats};
pub use server::App;
