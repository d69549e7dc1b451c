//! 后端接口客户端层
//!
//! `DeliveryApi` 是子系统与后端的唯一缝隙：
//! 生产环境用 `HttpDeliveryApi`（reqwest 实现），测试用内存替身。

pub mod delivery_client;

pub use delivery_client::HttpDeliveryApi;

use crate::error::ApiFailure;
use crate::models::{DeliveryPayload, LoginData, TaskRecord, WorkerInfoData};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// 上传进度回调，参数为 0-100 的百分比
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// 待上传的文件内容
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// 交付后端的五个接口契约
///
/// 每个调用都带显式超时：超时即按失败处理，绝不悬挂
#[async_trait]
pub trait DeliveryApi: Send + Sync {
    /// 短信登录，成功返回 accessToken
    async fn login(&self, phone: &str, code: &str) -> Result<LoginData, ApiFailure>;

    /// 拉取工人信息（展示名）
    async fn worker_info(&self, token: &str) -> Result<WorkerInfoData, ApiFailure>;

    /// 拉取我的任务列表
    async fn my_tasks(&self, token: &str, status_type: i64) -> Result<Vec<TaskRecord>, ApiFailure>;

    /// 多段上传单个文件，成功返回后端分配的存储路径
    async fn upload(
        &self,
        token: &str,
        file: UploadFile,
        progress: ProgressFn,
    ) -> Result<String, ApiFailure>;

    /// 提交交付物
    async fn submit(&self, token: &str, payload: &DeliveryPayload) -> Result<(), ApiFailure>;
}
