//! 附件上传服务
//!
//! 负责附件的校验、入队和并发上传：
//! - 超限文件逐个告警跳过，不中断整次调用
//! - 数量上限按"已有附件 + 本次已入队"累计判断，到顶后对剩余文件只告警一次
//! - 同一次 enqueue 接受的附件全部并行上传（刻意不限并发，与登录分批不同）
//! - 上传结果一律按附件 id 回写；附件已被移除时结果作废

use crate::clients::{DeliveryApi, ProgressFn, UploadFile};
use crate::config::Config;
use crate::error::{AppResult, StateError, UploadError};
use crate::models::{Attachment, AttachmentKind, DraftKey, UploadState};
use crate::stores::{lock_state, SharedState};
use bytes::Bytes;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 待入队的文件
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub file_name: String,
    pub bytes: Bytes,
}

/// 一次 enqueue 调用的结果
pub struct EnqueueReport {
    /// 已接受并开始上传的附件 id（入队顺序）
    pub accepted: Vec<u64>,
    /// 校验告警（超限文件、数量到顶）
    pub warnings: Vec<String>,
    /// 每个附件的上传任务句柄，调用方可等待全部完成
    pub uploads: Vec<JoinHandle<()>>,
}

/// 附件上传服务
pub struct AttachmentUploader {
    api: Arc<dyn DeliveryApi>,
    config: Config,
    state: SharedState,
}

impl AttachmentUploader {
    pub fn new(api: Arc<dyn DeliveryApi>, config: Config, state: SharedState) -> Self {
        Self { api, config, state }
    }

    /// 校验并入队一批文件，随即并行上传
    pub fn enqueue(
        &self,
        key: &DraftKey,
        files: Vec<StagedFile>,
        kind: AttachmentKind,
    ) -> AppResult<EnqueueReport> {
        let limit = match kind {
            AttachmentKind::Image => self.config.max_image_attachments,
            AttachmentKind::File => self.config.max_file_attachments,
        };

        let mut warnings = Vec::new();
        let mut staged = Vec::new();
        let token = {
            let mut state = lock_state(&self.state);
            let token = state
                .registry
                .token_of(&key.phone)
                .ok_or_else(|| StateError::SessionNotFound {
                    phone: key.phone.clone(),
                })?;
            state.drafts.get_or_create(key);

            // 已有附件 + 本次已入队 的累计计数
            let mut count = state
                .drafts
                .get(key)
                .map(|d| d.count_of_kind(kind))
                .unwrap_or(0);
            let mut ceiling_hit = false;

            for file in files {
                if file.bytes.len() as u64 > self.config.max_attachment_bytes {
                    warn!(
                        "文件 {} 大小 {} 字节超过上限，已跳过",
                        file.file_name,
                        file.bytes.len()
                    );
                    warnings.push(format!(
                        "文件 {} 超过 {}MB 上限，已跳过",
                        file.file_name,
                        self.config.max_attachment_bytes / (1024 * 1024)
                    ));
                    continue;
                }
                if count >= limit {
                    if !ceiling_hit {
                        warn!("附件数量已达上限 {}，剩余文件不再入队", limit);
                        warnings.push(format!("附件数量已达上限 {} 个，多余文件已忽略", limit));
                        ceiling_hit = true;
                    }
                    continue;
                }

                let id = state.next_attachment_id();
                let preview = (kind == AttachmentKind::Image)
                    .then(|| state.previews.create(&file.file_name));
                let attachment = Attachment {
                    id,
                    file_name: file.file_name.clone(),
                    size_bytes: file.bytes.len() as u64,
                    kind,
                    preview,
                    state: UploadState::Uploading { progress: 0 },
                };
                state.drafts.push_attachment(key, attachment)?;
                staged.push((id, file));
                count += 1;
            }
            token
        };

        info!(
            "草稿 {} 入队 {} 个附件，开始并行上传",
            key,
            staged.len()
        );

        let mut accepted = Vec::new();
        let mut uploads = Vec::new();
        for (id, file) in staged {
            accepted.push(id);
            uploads.push(self.spawn_upload(key.clone(), id, file, token.clone()));
        }

        Ok(EnqueueReport {
            accepted,
            warnings,
            uploads,
        })
    }

    /// 移除附件并释放其预览句柄
    ///
    /// 不取消在途请求，只保证迟到的结果被忽略
    pub fn remove(&self, key: &DraftKey, attachment_id: u64) -> AppResult<()> {
        let mut state = lock_state(&self.state);
        let hit = {
            let crate::stores::ConsoleState {
                drafts, previews, ..
            } = &mut *state;
            drafts.remove_attachment(key, attachment_id, previews)?
        };
        if hit {
            info!("移除附件 {} (草稿 {})", attachment_id, key);
        } else {
            debug!("附件 {} 不在草稿 {} 中，忽略移除请求", attachment_id, key);
        }
        Ok(())
    }

    /// 启动单个附件的上传任务
    fn spawn_upload(
        &self,
        key: DraftKey,
        attachment_id: u64,
        file: StagedFile,
        token: String,
    ) -> JoinHandle<()> {
        let api = self.api.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            let progress_state = state.clone();
            let progress_key = key.clone();
            let progress: ProgressFn = Arc::new(move |percent| {
                let mut st = lock_state(&progress_state);
                st.drafts.patch_attachment(&progress_key, attachment_id, |a| {
                    if a.is_uploading() {
                        a.state = UploadState::Uploading { progress: percent };
                    }
                });
            });

            let upload_file = UploadFile {
                file_name: file.file_name.clone(),
                bytes: file.bytes,
            };
            let result = api.upload(&token, upload_file, progress).await;

            let mut st = lock_state(&state);
            let applied = st.drafts.patch_attachment(&key, attachment_id, |a| match &result {
                Ok(remote_path) => {
                    a.state = UploadState::Uploaded {
                        remote_path: remote_path.clone(),
                    };
                }
                Err(failure) => {
                    a.state = UploadState::Failed {
                        reason: UploadError::from(failure.clone()).to_string(),
                    };
                }
            });

            match (&result, applied) {
                (Ok(_), true) => info!("附件 {} 上传完成 ({})", attachment_id, file.file_name),
                (Err(e), true) => warn!("附件 {} 上传失败: {}", attachment_id, e),
                (_, false) => {
                    debug!("附件 {} 已被移除，忽略迟到的上传结果", attachment_id)
                }
            }
        })
    }
}
