//! 批量登录认证器
//!
//! 把一段原始手机号文本变成一组可用的工人会话：
//! 解析 → 分批（默认每批 5 个）→ 批内并发登录 → 逐个收集结果。
//! 第 N 批全部出结果后才开始第 N+1 批，出站并发被批大小约束。
//! 批内任何一个号码失败都不影响同批其他号码（结果聚合，不是快速失败）。

use crate::clients::DeliveryApi;
use crate::config::Config;
use crate::error::{AppResult, AuthError, ValidationError};
use crate::models::{Task, WorkerSession};
use crate::services::phone_parser::parse_phone_numbers;
use futures::future::join_all;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// 降级拉取的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// 工人信息（失败时展示名回落为手机号）
    Profile,
    /// 任务列表（失败时队列为空）
    TaskList,
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchKind::Profile => write!(f, "工人信息"),
            FetchKind::TaskList => write!(f, "任务列表"),
        }
    }
}

/// 会话仍可用的降级记录
#[derive(Debug, Clone)]
pub struct PartialFetch {
    pub phone: String,
    pub kind: FetchKind,
    pub message: String,
}

/// 一次批量认证的完整结果
#[derive(Debug, Default)]
pub struct AuthReport {
    /// 可用会话，按批次顺序、批内按输入顺序排列
    pub sessions: Vec<WorkerSession>,
    /// 登录失败的号码（不影响同批其他号码）
    pub failures: Vec<AuthError>,
    /// 降级但未失败的拉取记录
    pub partial: Vec<PartialFetch>,
}

/// 批量登录认证器
pub struct SessionAuthenticator {
    api: Arc<dyn DeliveryApi>,
    config: Config,
}

impl SessionAuthenticator {
    pub fn new(api: Arc<dyn DeliveryApi>, config: Config) -> Self {
        Self { api, config }
    }

    /// 批量认证
    ///
    /// 没有任何有效手机号时直接返回校验错误，不发起网络请求
    pub async fn authenticate(&self, raw_phone_text: &str) -> AppResult<AuthReport> {
        let phones = parse_phone_numbers(raw_phone_text);
        if phones.is_empty() {
            return Err(ValidationError::NoValidPhoneNumbers.into());
        }

        let batch_size = self.config.auth_batch_size.max(1);
        let total_batches = (phones.len() + batch_size - 1) / batch_size;
        info!(
            "🚀 开始批量登录: 共 {} 个手机号，每批 {} 个",
            phones.len(),
            batch_size
        );

        let mut report = AuthReport::default();
        for (batch_index, batch) in phones.chunks(batch_size).enumerate() {
            info!(
                "📦 第 {}/{} 批登录: {} 个号码",
                batch_index + 1,
                total_batches,
                batch.len()
            );

            // 批内并发，逐个收集结果
            let outcomes = join_all(batch.iter().map(|phone| self.build_session(phone))).await;
            for outcome in outcomes {
                match outcome {
                    Ok((session, partials)) => {
                        report.sessions.push(session);
                        report.partial.extend(partials);
                    }
                    Err(e) => {
                        warn!("{}", e);
                        report.failures.push(e);
                    }
                }
            }
        }

        info!(
            "✓ 批量登录完成: 成功 {} 个，失败 {} 个，降级 {} 项",
            report.sessions.len(),
            report.failures.len(),
            report.partial.len()
        );
        Ok(report)
    }

    /// 复用已有 token 重新拉取任务列表（不重新登录），批次纪律与认证相同
    ///
    /// 返回 (手机号, 新任务列表)；拉取失败的号码返回 None，由调用方保留旧队列
    pub async fn refresh(
        &self,
        credentials: Vec<(String, String)>,
    ) -> Vec<(String, Option<Vec<Task>>)> {
        let batch_size = self.config.auth_batch_size.max(1);
        let mut results = Vec::with_capacity(credentials.len());

        for batch in credentials.chunks(batch_size) {
            let fetched = join_all(batch.iter().map(|(phone, token)| async move {
                match self.api.my_tasks(token, self.config.task_status_type).await {
                    Ok(records) => (phone.clone(), Some(self.filter_deliverable(records))),
                    Err(e) => {
                        warn!("刷新任务列表失败 ({}): {}，保留原队列", phone, e);
                        (phone.clone(), None)
                    }
                }
            }))
            .await;
            results.extend(fetched);
        }
        results
    }

    /// 单个号码的会话建立流程
    ///
    /// 登录失败对该工人致命；工人信息和任务列表并发拉取，各自独立容错
    async fn build_session(
        &self,
        phone: &str,
    ) -> Result<(WorkerSession, Vec<PartialFetch>), AuthError> {
        let login = self
            .api
            .login(phone, &self.config.sms_code)
            .await
            .map_err(|f| AuthError::from_api(phone, f))?;
        let token = login.access_token;

        let (info_result, tasks_result) = tokio::join!(
            self.api.worker_info(&token),
            self.api.my_tasks(&token, self.config.task_status_type)
        );

        let mut partials = Vec::new();

        let display_name = match info_result {
            Ok(info) => info
                .realname
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| phone.to_string()),
            Err(e) => {
                warn!("拉取工人信息失败 ({}): {}，展示名回落为手机号", phone, e);
                partials.push(PartialFetch {
                    phone: phone.to_string(),
                    kind: FetchKind::Profile,
                    message: e.to_string(),
                });
                phone.to_string()
            }
        };

        let tasks = match tasks_result {
            Ok(records) => self.filter_deliverable(records),
            Err(e) => {
                warn!("拉取任务列表失败 ({}): {}，队列置空", phone, e);
                partials.push(PartialFetch {
                    phone: phone.to_string(),
                    kind: FetchKind::TaskList,
                    message: e.to_string(),
                });
                Vec::new()
            }
        };

        info!(
            "✓ 登录成功: {} ({})，可交付任务 {} 个",
            display_name,
            phone,
            tasks.len()
        );

        Ok((
            WorkerSession {
                phone: phone.to_string(),
                token,
                display_name,
                tasks,
            },
            partials,
        ))
    }

    /// 只保留可交付且非测试标记的任务
    fn filter_deliverable(&self, records: Vec<crate::models::TaskRecord>) -> Vec<Task> {
        records
            .into_iter()
            .map(Task::from)
            .filter(|t| t.is_deliverable(self.config.deliverable_status))
            .collect()
    }
}
