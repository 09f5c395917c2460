//! HTTP 接口的请求/响应结构，服务端和客户端共用

use serde::{Deserialize, Deserializer, Serialize};

/// `POST /api/image/upload` 成功响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub caption: String,
    pub file_path: String,
}

/// `POST /api/image/review` 请求体
///
/// 字段缺失时取默认值，由审核服务统一校验
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewRequest {
    pub file_path: String,
    /// 允许为 `null`，按空字符串处理
    #[serde(deserialize_with = "null_as_empty")]
    pub approved_caption: String,
    pub is_approved: bool,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
