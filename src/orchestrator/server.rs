use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::clients::build_caption_provider;
use crate::config::Config;
use crate::http::{build_router, AppState};
use crate::infrastructure::UploadStore;
use crate::utils::logging::log_startup;

/// 服务端应用
pub struct App {
    config: Config,
    router: Router,
}

impl App {
    /// 初始化应用：创建存储、描述服务和路由
    pub fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let store = Arc::new(UploadStore::new(&config.upload_dir));
        let provider = build_caption_provider(&config)?;
        let router = build_router(AppState::new(store, provider), config.max_upload_bytes);

        Ok(Self { config, router })
    }

    /// 监听端口并处理请求，直到收到 Ctrl+C
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .with_context(|| format!("无法监听地址: {}", self.config.bind_addr))?;
        info!("✓ 服务已启动: http://{}", listener.local_addr()?);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("服务异常退出")?;

        info!("👋 服务已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("收到退出信号，正在停止服务...");
}
