use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 图片描述服务类型
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionProviderKind {
    /// multipart 上传到 `/generate-caption`
    #[default]
    Http,
    /// OpenAI 兼容的视觉模型
    Vision,
}

impl FromStr for CaptionProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "vision" => Ok(Self::Vision),
            other => Err(format!("未知的描述服务类型: {}", other)),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 服务监听地址
    pub bind_addr: String,
    /// 上传文件存放目录
    pub upload_dir: PathBuf,
    /// 单次上传大小上限（字节）
    pub max_upload_bytes: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 描述服务配置 ---
    pub caption_provider: CaptionProviderKind,
    pub caption_api_base_url: String,
    pub caption_timeout_secs: u64,
    // --- 视觉模型配置 ---
    pub vision_api_key: String,
    pub vision_api_base_url: String,
    pub vision_model_name: String,
    // --- 客户端配置 ---
    /// 后端服务地址（review 子命令使用）
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            upload_dir: PathBuf::from("Uploads"),
            max_upload_bytes: 10 * 1024 * 1024,
            verbose_logging: false,
            caption_provider: CaptionProviderKind::Http,
            caption_api_base_url: "https://gemini-ai-api.com".to_string(),
            caption_timeout_secs: 30,
            vision_api_key: String::new(),
            vision_api_base_url: "https://api.openai.com/v1".to_string(),
            vision_model_name: "gpt-4o-mini".to_string(),
            api_base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

impl Config {
    /// 默认配置 + 环境变量覆盖
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，再用环境变量覆盖
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(config.with_env_overrides())
    }

    /// 有配置文件时读文件，否则只读环境变量
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::from_env()),
        }
    }

    fn with_env_overrides(self) -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", self.bind_addr),
            upload_dir: env_or("UPLOAD_DIR", self.upload_dir),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", self.max_upload_bytes),
            verbose_logging: env_or("VERBOSE_LOGGING", self.verbose_logging),
            caption_provider: env_or("CAPTION_PROVIDER", self.caption_provider),
            caption_api_base_url: env_or("CAPTION_API_BASE_URL", self.caption_api_base_url),
            caption_timeout_secs: env_or("CAPTION_TIMEOUT_SECS", self.caption_timeout_secs),
            vision_api_key: env_or("VISION_API_KEY", self.vision_api_key),
            vision_api_base_url: env_or("VISION_API_BASE_URL", self.vision_api_base_url),
            vision_model_name: env_or("VISION_MODEL_NAME", self.vision_model_name),
            api_base_url: env_or("API_BASE_URL", self.api_base_url),
        }
    }
}

/// 环境变量存在且能解析时使用其值，否则保留原值
fn env_or<T: FromStr>(name: &str, current: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(current)
}
