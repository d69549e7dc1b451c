//! 后端接口报文结构
//!
//! 所有接口共用 `{code, msg, data}` 信封，code == 0 表示成功

use serde::{Deserialize, Serialize};

/// 通用响应信封
///
/// msg 和 data 缺失时按 None 处理（Option 字段无需 default，
/// 否则派生的 Deserialize 会给 T 强加 Default 约束）
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    pub msg: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    pub fn message(&self) -> String {
        self.msg.clone().unwrap_or_else(|| "未知错误".to_string())
    }
}

/// 短信登录响应数据
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: String,
}

/// 工人信息响应数据
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerInfoData {
    #[serde(default)]
    pub realname: Option<String>,
}

/// 任务列表分页响应数据
#[derive(Debug, Clone, Deserialize)]
pub struct TaskPageData {
    #[serde(default)]
    pub list: Vec<TaskRecord>,
}

/// 任务列表单条记录
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(default)]
    pub task_id: i64,
    #[serde(default)]
    pub task_assign_id: i64,
    #[serde(default)]
    pub task_staff_id: i64,
    #[serde(default)]
    pub task_name: String,
    #[serde(default)]
    pub task_desc: String,
    #[serde(default)]
    pub my_status: i64,
    #[serde(default)]
    pub min_cost: f64,
    #[serde(default)]
    pub max_cost: f64,
}

/// 文件上传响应数据
///
/// 后端存在两种返回形态：直接返回路径字符串，或返回 {fileName|url} 对象
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UploadData {
    Path(String),
    #[serde(rename_all = "camelCase")]
    Object {
        #[serde(default)]
        file_name: Option<String>,
        #[serde(default)]
        url: Option<String>,
    },
}

impl UploadData {
    /// 提取后端分配的存储路径
    pub fn into_remote_path(self) -> Option<String> {
        match self {
            UploadData::Path(p) if !p.is_empty() => Some(p),
            UploadData::Path(_) => None,
            UploadData::Object { url, file_name } => {
                url.filter(|s| !s.is_empty()).or(file_name.filter(|s| !s.is_empty()))
            }
        }
    }
}

/// 交付物提交报文
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryPayload {
    pub task_id: i64,
    pub task_staff_id: i64,
    pub task_assign_id: i64,
    pub task_content: String,
    pub report_name: String,
    pub report_address: String,
    pub supplement: String,
    pub attachments: Vec<DeliveryAttachment>,
}

/// 提交报文中的附件条目
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAttachment {
    pub file_name: String,
    pub temp_path: String,
    pub file_type: String,
    pub upload_time: String,
    pub file_length: u64,
    pub is_pic: i32,
    pub is_wx: i32,
    pub file_path: String,
}
