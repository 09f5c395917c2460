use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 请求参数错误
    #[error("参数错误: {0}")]
    Validation(#[from] ValidationError),
    /// 文件存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
    /// 图片描述服务错误
    #[error("描述服务错误: {0}")]
    Provider(#[from] ProviderError),
    /// 后端接口调用错误（客户端使用）
    #[error("后端接口错误: {0}")]
    Api(#[from] ApiError),
    /// 会话状态错误（客户端使用）
    #[error("会话错误: {0}")]
    Session(#[from] SessionError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 请求参数错误
#[derive(Debug, Error)]
pub enum ValidationError {
    /// 上传内容为空
    #[error("empty upload")]
    EmptyUpload,
    /// 缺少必填字段
    #[error("缺少字段: {field}")]
    MissingField { field: &'static str },
    /// 请求体无法解析
    #[error("请求体无效: {message}")]
    InvalidBody { message: String },
    /// 请求体超过大小限制
    #[error("请求体过大: {message}")]
    PayloadTooLarge { message: String },
}

/// 文件存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 创建目录失败
    #[error("创建目录失败 ({}): {source}", .path.display())]
    CreateDirFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({}): {source}", .path.display())]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 读取文件失败
    #[error("读取文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// 图片描述服务错误
#[derive(Debug, Error)]
pub enum ProviderError {
    /// 服务不可达或返回非成功状态
    #[error("描述服务不可用 ({endpoint}): {reason}")]
    Unavailable { endpoint: String, reason: String },
    /// 返回内容无法解析为描述文本
    #[error("描述服务返回内容无效 ({endpoint}): {reason}")]
    BadResponse { endpoint: String, reason: String },
    /// 请求构建失败
    #[error("描述请求构建失败: {reason}")]
    InvalidRequest { reason: String },
}

/// 后端接口调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        source: reqwest::Error,
    },
    /// 返回非成功状态
    #[error("返回错误状态 ({endpoint}): HTTP {status}, {body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// 响应解析失败
    #[error("响应解析失败 ({endpoint}): {source}")]
    DecodeFailed {
        endpoint: String,
        source: reqwest::Error,
    },
}

/// 会话状态错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// 当前状态不允许该操作
    #[error("状态 {from} 不允许操作 {action}")]
    InvalidTransition {
        from: &'static str,
        action: &'static str,
    },
    /// 图片槽位不存在
    #[error("图片槽位不存在: {index}")]
    UnknownSlot { index: usize },
    /// 导出失败
    #[error("导出失败: {message}")]
    ExportFailed { message: String },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 读取配置文件失败
    #[error("读取配置文件失败 ({}): {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("配置文件解析失败 ({}): {source}", .path.display())]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
    /// HTTP 客户端初始化失败
    #[error("HTTP 客户端初始化失败: {0}")]
    HttpClient(#[from] reqwest::Error),
    /// 配置项缺失
    #[error("缺少配置项: {name}")]
    Missing { name: &'static str },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求体无效错误
    pub fn invalid_body(message: impl Into<String>) -> Self {
        AppError::Validation(ValidationError::InvalidBody {
            message: message.into(),
        })
    }

    /// 创建描述服务不可用错误
    pub fn provider_unavailable(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Provider(ProviderError::Unavailable {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        })
    }

    /// 创建描述服务返回无效错误
    pub fn provider_bad_response(endpoint: impl Into<String>, reason: impl ToString) -> Self {
        AppError::Provider(ProviderError::BadResponse {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        })
    }

    /// 创建状态转换错误
    pub fn invalid_transition(from: &'static str, action: &'static str) -> Self {
        AppError::Session(SessionError::InvalidTransition { from, action })
    }

    /// 对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(ValidationError::PayloadTooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_)
            | AppError::Provider(_)
            | AppError::Api(_)
            | AppError::Session(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 错误码，写入响应体
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(ValidationError::EmptyUpload) => "empty_upload",
            AppError::Validation(ValidationError::PayloadTooLarge { .. }) => "payload_too_large",
            AppError::Validation(_) => "validation_failed",
            AppError::Storage(_) => "storage_failed",
            AppError::Provider(ProviderError::Unavailable { .. }) => "provider_unavailable",
            AppError::Provider(_) => "provider_error",
            AppError::Api(_) => "api_failed",
            AppError::Session(_) => "session_failed",
            AppError::Config(_) => "config_failed",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("请求处理失败: {}", self);
        } else {
            warn!("请求被拒绝: {}", self);
        }
        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));
        (status, body).into_response()
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
