//! 交付控制台 - 编排层入口
//!
//! 子系统唯一的对外门面，暴露七个操作：
//! authenticate / refresh / select_task / update_draft_field /
//! enqueue_attachments / remove_attachment / submit，外加 logout 清理。
//!
//! 资源归属：控制台唯一持有共享状态（会话登记处、草稿仓库、预览句柄登记处、
//! 当前选中），各组件通过同一把锁访问；锁从不跨 await 持有。

use crate::clients::{DeliveryApi, HttpDeliveryApi};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{AttachmentKind, Draft, DraftField, DraftKey, WorkerSession};
use crate::orchestrator::session_authenticator::{AuthReport, SessionAuthenticator};
use crate::orchestrator::submission_coordinator::{SubmissionCoordinator, SubmitOutcome};
use crate::services::uploader::{AttachmentUploader, EnqueueReport, StagedFile};
use crate::stores::{lock_state, shared_state, SharedState};
use std::sync::Arc;
use tracing::{info, warn};

/// 多工人交付控制台
pub struct DeliveryConsole {
    state: SharedState,
    authenticator: SessionAuthenticator,
    uploader: AttachmentUploader,
    coordinator: SubmissionCoordinator,
}

impl DeliveryConsole {
    /// 用真实后端客户端创建
    pub fn new(config: Config) -> Self {
        let api: Arc<dyn DeliveryApi> = Arc::new(HttpDeliveryApi::new(&config));
        Self::with_api(api, config)
    }

    /// 注入自定义后端实现（测试用替身走这里）
    pub fn with_api(api: Arc<dyn DeliveryApi>, config: Config) -> Self {
        let state = shared_state();
        Self {
            authenticator: SessionAuthenticator::new(api.clone(), config.clone()),
            uploader: AttachmentUploader::new(api.clone(), config, state.clone()),
            coordinator: SubmissionCoordinator::new(api, state.clone()),
            state,
        }
    }

    /// 批量认证，替换全部会话并应用默认选中
    ///
    /// 旧会话、旧草稿整体作废（预览句柄逐一释放后清空）
    pub async fn authenticate(&self, raw_phone_text: &str) -> AppResult<AuthReport> {
        let report = self.authenticator.authenticate(raw_phone_text).await?;

        let mut state = lock_state(&self.state);
        state.reset();
        state.registry.replace_sessions(report.sessions.clone());

        // 默认选中：结果顺序里第一个队列非空的工人的首个任务
        if let Some(key) = state.registry.first_selection() {
            state.drafts.get_or_create(&key);
            state.selection = Some(key.clone());
            info!("默认选中: {}", key);
        } else {
            state.selection = None;
        }

        Ok(report)
    }

    /// 复用 token 重新拉取全部任务队列
    ///
    /// 拉取失败的工人保留旧队列；消失任务的草稿原样保留为孤儿；
    /// 当前选中的任务已不存在时按默认策略重新选中
    pub async fn refresh(&self) -> AppResult<()> {
        let credentials: Vec<(String, String)> = {
            let state = lock_state(&self.state);
            state
                .registry
                .sessions()
                .iter()
                .map(|s| (s.phone.clone(), s.token.clone()))
                .collect()
        };
        if credentials.is_empty() {
            warn!("没有活跃会话，刷新跳过");
            return Ok(());
        }

        let results = self.authenticator.refresh(credentials).await;

        let mut state = lock_state(&self.state);
        for (phone, tasks) in results {
            if let Some(tasks) = tasks {
                state.registry.replace_queue(&phone, tasks);
            }
        }

        let selection_alive = state
            .selection
            .as_ref()
            .map(|key| state.registry.find_task(&key.phone, key.assignment_id).is_some())
            .unwrap_or(false);
        if !selection_alive {
            state.selection = state.registry.first_selection();
            if let Some(key) = state.selection.clone() {
                state.drafts.get_or_create(&key);
            }
        }
        Ok(())
    }

    /// 选中某个任务，惰性创建其草稿
    pub fn select_task(&self, phone: &str, assignment_id: i64) -> AppResult<DraftKey> {
        let mut state = lock_state(&self.state);
        if state.registry.find_task(phone, assignment_id).is_none() {
            return Err(AppError::task_not_found(phone, assignment_id));
        }
        let key = DraftKey::new(phone, assignment_id);
        state.drafts.get_or_create(&key);
        state.selection = Some(key.clone());
        Ok(key)
    }

    /// 更新草稿单个字段，其余草稿完全隔离
    pub fn update_draft_field(
        &self,
        phone: &str,
        assignment_id: i64,
        field: DraftField,
        value: &str,
    ) -> AppResult<()> {
        let key = DraftKey::new(phone, assignment_id);
        let mut state = lock_state(&self.state);
        state.drafts.update_field(&key, field, value)?;
        Ok(())
    }

    /// 入队一批附件并并行上传
    pub fn enqueue_attachments(
        &self,
        phone: &str,
        assignment_id: i64,
        files: Vec<StagedFile>,
        kind: AttachmentKind,
    ) -> AppResult<EnqueueReport> {
        let key = DraftKey::new(phone, assignment_id);
        self.uploader.enqueue(&key, files, kind)
    }

    /// 移除附件（不取消在途上传，迟到结果被忽略）
    pub fn remove_attachment(
        &self,
        phone: &str,
        assignment_id: i64,
        attachment_id: u64,
    ) -> AppResult<()> {
        let key = DraftKey::new(phone, assignment_id);
        self.uploader.remove(&key, attachment_id)
    }

    /// 提交草稿；成功后任务退役、草稿丢弃、选中推进
    pub async fn submit(&self, phone: &str, assignment_id: i64) -> AppResult<SubmitOutcome> {
        let key = DraftKey::new(phone, assignment_id);
        self.coordinator.submit(&key).await
    }

    /// 登出：释放全部预览句柄，清空会话、草稿与选中
    pub fn logout(&self) {
        let mut state = lock_state(&self.state);
        state.reset();
        info!("已登出，状态重置完毕");
    }

    // ========== 状态快照 ==========

    /// 当前选中的 (工人, 任务)
    pub fn selection(&self) -> Option<DraftKey> {
        lock_state(&self.state).selection.clone()
    }

    /// 会话列表快照
    pub fn sessions(&self) -> Vec<WorkerSession> {
        lock_state(&self.state).registry.sessions().to_vec()
    }

    /// 草稿快照
    pub fn draft(&self, phone: &str, assignment_id: i64) -> Option<Draft> {
        let key = DraftKey::new(phone, assignment_id);
        lock_state(&self.state).drafts.get(&key).cloned()
    }

    /// 尚未释放的预览句柄数量
    pub fn live_preview_count(&self) -> usize {
        lock_state(&self.state).previews.live_count()
    }

    /// 某个预览句柄的累计释放次数
    pub fn preview_release_count(&self, preview_id: u64) -> u32 {
        lock_state(&self.state).previews.release_count(preview_id)
    }
}
