//! 提交协调器
//!
//! 驱动单份草稿的提交状态机：
//! 编辑中 → 校验中 → 提交中 → 完成 / 驳回回到编辑中。
//! 校验或附件未就绪直接拦截，不发起网络请求；
//! 提交成功后退役任务、丢弃草稿并推进选中；
//! 提交失败时草稿与任务原样保留，重试不丢数据。

use crate::clients::DeliveryApi;
use crate::error::{AppError, AppResult, FieldIssue, SubmitError, ValidationError};
use crate::models::{
    DeliveryAttachment, DeliveryPayload, Draft, DraftField, DraftKey, SubmitPhase, Task,
};
use crate::stores::{lock_state, ConsoleState, SharedState};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 字段长度限制（按字符计）
const TITLE_MAX: usize = 20;
const CONTENT_MAX: usize = 300;
const ADDRESS_MAX: usize = 100;
const SUPPLEMENT_MAX: usize = 50;

/// 一次成功提交的结果
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub phone: String,
    pub assignment_id: i64,
    /// 提交后全局推进到的新选中；提交会改变全局选中，调用方须据此重新渲染
    pub next_selection: Option<DraftKey>,
}

/// 提交协调器
pub struct SubmissionCoordinator {
    api: Arc<dyn DeliveryApi>,
    state: SharedState,
}

impl SubmissionCoordinator {
    pub fn new(api: Arc<dyn DeliveryApi>, state: SharedState) -> Self {
        Self { api, state }
    }

    /// 提交一份草稿
    pub async fn submit(&self, key: &DraftKey) -> AppResult<SubmitOutcome> {
        // 锁内完成校验和报文组装，网络调用在锁外
        let (token, payload) = {
            let mut state = lock_state(&self.state);
            let task = state
                .registry
                .find_task(&key.phone, key.assignment_id)
                .cloned()
                .ok_or_else(|| AppError::task_not_found(&key.phone, key.assignment_id))?;
            let token = state
                .registry
                .token_of(&key.phone)
                .ok_or_else(|| AppError::session_not_found(&key.phone))?;
            let draft = state
                .drafts
                .get(key)
                .cloned()
                .ok_or_else(|| AppError::draft_not_found(key))?;

            // 同一草稿只允许一次在途提交，重复调用在锁内直接拦截
            if matches!(
                draft.phase,
                SubmitPhase::Validating | SubmitPhase::Submitting
            ) {
                warn!("草稿 {} 已有提交在途，拒绝重复提交", key);
                return Err(ValidationError::SubmitInProgress.into());
            }

            state.drafts.set_phase(key, SubmitPhase::Validating);
            if let Err(e) = validate_fields(&draft) {
                state.drafts.set_phase(key, SubmitPhase::Editing);
                return Err(e.into());
            }
            if let Err(e) = check_attachments_ready(&draft) {
                state.drafts.set_phase(key, SubmitPhase::Editing);
                return Err(e.into());
            }

            let payload = build_payload(&task, &draft);
            state.drafts.set_phase(key, SubmitPhase::Submitting);
            (token, payload)
        };

        info!(
            "📤 提交交付物: 任务 {} / 分派 {} / 附件 {} 个",
            payload.task_id,
            payload.task_assign_id,
            payload.attachments.len()
        );
        debug!(
            "提交报文: taskId={} taskStaffId={} taskAssignId={} 名称={} 地址={} 内容 {} 字 补充 {} 字",
            payload.task_id,
            payload.task_staff_id,
            payload.task_assign_id,
            payload.report_name,
            payload.report_address,
            payload.task_content.chars().count(),
            payload.supplement.chars().count()
        );
        for attachment in &payload.attachments {
            debug!(
                "  附件 {}: 类型={} 大小={} 字节 isPic={} 上传时间={} 路径={}",
                attachment.file_name,
                attachment.file_type,
                attachment.file_length,
                attachment.is_pic,
                attachment.upload_time,
                attachment.file_path
            );
        }

        match self.api.submit(&token, &payload).await {
            Ok(()) => {
                let mut state = lock_state(&self.state);
                state.drafts.set_phase(key, SubmitPhase::Completed);

                let ConsoleState {
                    registry,
                    drafts,
                    previews,
                    selection,
                    ..
                } = &mut *state;
                drafts.discard(key, previews);
                registry.remove_task(&key.phone, key.assignment_id);

                let next = registry.next_selection(&key.phone);
                if let Some(next_key) = &next {
                    drafts.get_or_create(next_key);
                }
                *selection = next.clone();

                info!(
                    "✅ 提交成功: {}，下一个选中: {:?}",
                    key,
                    next.as_ref().map(|k| k.to_string())
                );
                Ok(SubmitOutcome {
                    phone: key.phone.clone(),
                    assignment_id: key.assignment_id,
                    next_selection: next,
                })
            }
            Err(failure) => {
                let mut state = lock_state(&self.state);
                state.drafts.set_phase(key, SubmitPhase::Editing);
                let error = SubmitError::from(failure);
                warn!("❌ 提交失败: {} ({})", error, key);
                Err(error.into())
            }
        }
    }
}

/// 校验草稿必填字段
fn validate_fields(draft: &Draft) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    check_length(&mut issues, DraftField::Title, &draft.title, 1, TITLE_MAX);
    check_length(&mut issues, DraftField::Content, &draft.content, 1, CONTENT_MAX);
    check_length(&mut issues, DraftField::Address, &draft.address, 1, ADDRESS_MAX);
    check_length(&mut issues, DraftField::Supplement, &draft.supplement, 0, SUPPLEMENT_MAX);

    if !issues.is_empty() {
        return Err(ValidationError::FieldErrors { issues });
    }
    if draft.attachments.is_empty() {
        return Err(ValidationError::NoAttachments);
    }
    Ok(())
}

fn check_length(
    issues: &mut Vec<FieldIssue>,
    field: DraftField,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        issues.push(FieldIssue {
            field,
            reason: "不能为空".to_string(),
        });
    } else if len > max {
        issues.push(FieldIssue {
            field,
            reason: format!("不能超过 {} 个字符", max),
        });
    }
}

/// 所有附件必须已上传且带远端路径，否则拦截提交
fn check_attachments_ready(draft: &Draft) -> Result<(), ValidationError> {
    let uploading = draft.attachments.iter().filter(|a| a.is_uploading()).count();
    let failed = draft.attachments.iter().filter(|a| a.is_failed()).count();
    let missing = draft
        .attachments
        .iter()
        .filter(|a| !a.is_uploading() && !a.is_failed() && a.remote_path().is_none())
        .count();

    if uploading + failed + missing > 0 {
        return Err(ValidationError::AttachmentsNotReady {
            uploading,
            failed,
            missing,
        });
    }
    Ok(())
}

/// 从任务快照和草稿组装提交报文
fn build_payload(task: &Task, draft: &Draft) -> DeliveryPayload {
    let upload_time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let attachments = draft
        .attachments
        .iter()
        .map(|a| {
            let path = a.remote_path().unwrap_or_default().to_string();
            DeliveryAttachment {
                file_name: a.file_name.clone(),
                temp_path: path.clone(),
                file_type: file_extension(&a.file_name),
                upload_time: upload_time.clone(),
                file_length: a.size_bytes,
                is_pic: a.is_image() as i32,
                is_wx: 0,
                file_path: path,
            }
        })
        .collect();

    DeliveryPayload {
        task_id: task.task_id,
        task_staff_id: task.staff_id,
        task_assign_id: task.assignment_id,
        task_content: draft.content.clone(),
        report_name: draft.title.clone(),
        report_address: draft.address.clone(),
        supplement: draft.supplement.clone(),
        attachments,
    }
}

/// 取小写扩展名，没有扩展名时为空串
fn file_extension(file_name: &str) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Attachment, AttachmentKind, UploadState};

    fn draft_with(title: &str, content: &str, address: &str, supplement: &str) -> Draft {
        let mut draft = Draft::new(DraftKey::new("13800000001", 1));
        draft.title = title.to_string();
        draft.content = content.to_string();
        draft.address = address.to_string();
        draft.supplement = supplement.to_string();
        draft.attachments.push(uploaded_attachment(1));
        draft
    }

    fn uploaded_attachment(id: u64) -> Attachment {
        Attachment {
            id,
            file_name: "a.png".to_string(),
            size_bytes: 10,
            kind: AttachmentKind::Image,
            preview: None,
            state: UploadState::Uploaded {
                remote_path: "/f/a.png".to_string(),
            },
        }
    }

    #[test]
    fn test_validate_boundary_lengths() {
        // 恰好在边界上应通过
        let ok = draft_with(
            &"标".repeat(20),
            &"内".repeat(300),
            &"址".repeat(100),
            &"补".repeat(50),
        );
        assert!(validate_fields(&ok).is_ok());

        // 超界一个字符即不通过
        let over = draft_with(&"标".repeat(21), "内容", "地址", "");
        match validate_fields(&over) {
            Err(ValidationError::FieldErrors { issues }) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].field, DraftField::Title);
            }
            other => panic!("意外结果: {:?}", other),
        }
    }

    #[test]
    fn test_validate_required_fields() {
        let empty = draft_with("", "", "", "");
        match validate_fields(&empty) {
            Err(ValidationError::FieldErrors { issues }) => {
                // 标题、内容、地址必填；补充说明可为空
                assert_eq!(issues.len(), 3);
            }
            other => panic!("意外结果: {:?}", other),
        }
    }

    #[test]
    fn test_validate_requires_attachment() {
        let mut draft = draft_with("标题", "内容", "地址", "");
        draft.attachments.clear();
        assert_eq!(validate_fields(&draft), Err(ValidationError::NoAttachments));
    }

    #[test]
    fn test_attachments_ready_gate() {
        let mut draft = draft_with("标题", "内容", "地址", "");
        draft.attachments.push(Attachment {
            id: 2,
            file_name: "b.png".to_string(),
            size_bytes: 10,
            kind: AttachmentKind::Image,
            preview: None,
            state: UploadState::Uploading { progress: 40 },
        });
        draft.attachments.push(Attachment {
            id: 3,
            file_name: "c.png".to_string(),
            size_bytes: 10,
            kind: AttachmentKind::Image,
            preview: None,
            state: UploadState::Failed {
                reason: "超时".to_string(),
            },
        });

        match check_attachments_ready(&draft) {
            Err(ValidationError::AttachmentsNotReady {
                uploading, failed, ..
            }) => {
                assert_eq!(uploading, 1);
                assert_eq!(failed, 1);
            }
            other => panic!("意外结果: {:?}", other),
        }
    }

    #[test]
    fn test_build_payload_shape() {
        let task = Task {
            task_id: 10,
            assignment_id: 11,
            staff_id: 12,
            title: "巡检".to_string(),
            description: String::new(),
            min_cost: 1.0,
            max_cost: 2.0,
            status: 2,
        };
        let draft = draft_with("上报", "内容", "地址", "补充");
        let payload = build_payload(&task, &draft);

        assert_eq!(payload.task_id, 10);
        assert_eq!(payload.task_staff_id, 12);
        assert_eq!(payload.task_assign_id, 11);
        assert_eq!(payload.report_name, "上报");
        assert_eq!(payload.attachments.len(), 1);
        assert_eq!(payload.attachments[0].file_type, "png");
        assert_eq!(payload.attachments[0].is_pic, 1);
        assert_eq!(payload.attachments[0].is_wx, 0);
        assert_eq!(payload.attachments[0].temp_path, "/f/a.png");
        assert_eq!(payload.attachments[0].file_path, "/f/a.png");
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.PNG"), "png");
        assert_eq!(file_extension("report.tar.gz"), "gz");
        assert_eq!(file_extension("noext"), "");
        assert_eq!(file_extension(".hidden"), "");
    }
}
