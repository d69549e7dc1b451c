//! 草稿仓库
//!
//! 持有全部 (工人, 任务) 草稿。每次修改都整体替换被寻址的那一份草稿，
//! 其余键的草稿不受影响；同一草稿内的附件更新按附件 id 逐条打补丁。

use crate::error::StateError;
use crate::models::{Attachment, Draft, DraftField, DraftKey, SubmitPhase};
use crate::stores::preview::PreviewRegistry;
use std::collections::HashMap;
use tracing::debug;

/// 草稿仓库
#[derive(Debug, Default)]
pub struct DraftStore {
    drafts: HashMap<DraftKey, Draft>,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出或惰性创建草稿
    ///
    /// 幂等：键已存在时原样返回，不会重置编辑中的内容
    pub fn get_or_create(&mut self, key: &DraftKey) -> &Draft {
        self.drafts
            .entry(key.clone())
            .or_insert_with(|| Draft::new(key.clone()))
    }

    pub fn get(&self, key: &DraftKey) -> Option<&Draft> {
        self.drafts.get(key)
    }

    pub fn contains(&self, key: &DraftKey) -> bool {
        self.drafts.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// 更新草稿的单个字段
    ///
    /// 克隆-修改-替换整份草稿，保证其他键完全隔离
    pub fn update_field(
        &mut self,
        key: &DraftKey,
        field: DraftField,
        value: &str,
    ) -> Result<(), StateError> {
        let mut draft = self
            .drafts
            .get(key)
            .cloned()
            .ok_or_else(|| StateError::DraftNotFound { key: key.clone() })?;
        match field {
            DraftField::Title => draft.title = value.to_string(),
            DraftField::Content => draft.content = value.to_string(),
            DraftField::Address => draft.address = value.to_string(),
            DraftField::Supplement => draft.supplement = value.to_string(),
        }
        self.drafts.insert(key.clone(), draft);
        Ok(())
    }

    /// 设置提交状态机阶段
    pub fn set_phase(&mut self, key: &DraftKey, phase: SubmitPhase) {
        if let Some(draft) = self.drafts.get_mut(key) {
            draft.phase = phase;
        }
    }

    /// 追加附件
    pub fn push_attachment(&mut self, key: &DraftKey, attachment: Attachment) -> Result<(), StateError> {
        let mut draft = self
            .drafts
            .get(key)
            .cloned()
            .ok_or_else(|| StateError::DraftNotFound { key: key.clone() })?;
        draft.attachments.push(attachment);
        self.drafts.insert(key.clone(), draft);
        Ok(())
    }

    /// 按附件 id 打补丁
    ///
    /// 返回是否命中。附件已被移除（或草稿已丢弃）时返回 false，
    /// 补丁被丢弃——迟到的上传结果靠这里变成无操作
    pub fn patch_attachment(
        &mut self,
        key: &DraftKey,
        attachment_id: u64,
        patch: impl FnOnce(&mut Attachment),
    ) -> bool {
        let Some(draft) = self.drafts.get(key) else {
            return false;
        };
        if draft.attachment(attachment_id).is_none() {
            return false;
        }
        let mut draft = draft.clone();
        if let Some(attachment) = draft.attachments.iter_mut().find(|a| a.id == attachment_id) {
            patch(attachment);
        }
        self.drafts.insert(key.clone(), draft);
        true
    }

    /// 移除附件并释放其预览句柄
    ///
    /// 无论附件处于什么上传状态都立即移除；返回是否命中
    pub fn remove_attachment(
        &mut self,
        key: &DraftKey,
        attachment_id: u64,
        previews: &mut PreviewRegistry,
    ) -> Result<bool, StateError> {
        let mut draft = self
            .drafts
            .get(key)
            .cloned()
            .ok_or_else(|| StateError::DraftNotFound { key: key.clone() })?;
        let before = draft.attachments.len();
        let mut removed_preview = None;
        draft.attachments.retain(|a| {
            if a.id == attachment_id {
                removed_preview = a.preview.clone();
                false
            } else {
                true
            }
        });
        let hit = draft.attachments.len() != before;
        if hit {
            self.drafts.insert(key.clone(), draft);
            if let Some(preview) = removed_preview {
                previews.release(preview.id);
            }
        }
        Ok(hit)
    }

    /// 丢弃草稿，释放其全部预览句柄
    pub fn discard(&mut self, key: &DraftKey, previews: &mut PreviewRegistry) -> bool {
        match self.drafts.remove(key) {
            Some(draft) => {
                for attachment in &draft.attachments {
                    if let Some(preview) = &attachment.preview {
                        previews.release(preview.id);
                    }
                }
                debug!("丢弃草稿 {}", key);
                true
            }
            None => false,
        }
    }

    /// 清空全部草稿（登出/销毁），逐一释放预览句柄
    pub fn clear_all(&mut self, previews: &mut PreviewRegistry) {
        let keys: Vec<DraftKey> = self.drafts.keys().cloned().collect();
        for key in keys {
            self.discard(&key, previews);
        }
    }
}
