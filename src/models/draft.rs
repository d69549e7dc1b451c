//! 草稿与附件模型
//!
//! 草稿以 (手机号, 分派ID) 二元键定位，避免字符串拼接键的碰撞问题

use std::fmt;

/// 草稿键：(工人手机号, 任务分派ID)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub phone: String,
    pub assignment_id: i64,
}

impl DraftKey {
    pub fn new(phone: impl Into<String>, assignment_id: i64) -> Self {
        Self {
            phone: phone.into(),
            assignment_id,
        }
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.phone, self.assignment_id)
    }
}

/// 附件类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// 图片，入队时创建本地预览句柄
    Image,
    /// 普通文件
    File,
}

/// 图片预览句柄
///
/// 非持有型引用，仅用于上传前/中的本地展示，
/// 由 PreviewRegistry 统一分配和释放（恰好释放一次）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub id: u64,
    pub url: String,
}

/// 附件上传状态
#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    /// 上传中，progress 为 0-100
    Uploading { progress: u8 },
    /// 上传完成，携带后端分配的存储路径
    Uploaded { remote_path: String },
    /// 上传失败
    Failed { reason: String },
}

/// 草稿附件
///
/// id 在入队时全局唯一分配，永不复用；
/// 迟到的网络结果一律按 id 匹配，匹配不到即丢弃
#[derive(Debug, Clone)]
pub struct Attachment {
    pub id: u64,
    pub file_name: String,
    pub size_bytes: u64,
    pub kind: AttachmentKind,
    /// 仅图片附件持有
    pub preview: Option<PreviewHandle>,
    pub state: UploadState,
}

impl Attachment {
    pub fn is_image(&self) -> bool {
        self.kind == AttachmentKind::Image
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.state, UploadState::Uploading { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, UploadState::Failed { .. })
    }

    /// 上传完成后的远端路径
    pub fn remote_path(&self) -> Option<&str> {
        match &self.state {
            UploadState::Uploaded { remote_path } => Some(remote_path),
            _ => None,
        }
    }
}

/// 草稿可编辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Title,
    Content,
    Address,
    Supplement,
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftField::Title => write!(f, "上报名称"),
            DraftField::Content => write!(f, "交付内容"),
            DraftField::Address => write!(f, "上报地址"),
            DraftField::Supplement => write!(f, "补充说明"),
        }
    }
}

/// 提交状态机阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPhase {
    /// 编辑中（初始态，校验/提交失败后回到此态）
    Editing,
    /// 校验中
    Validating,
    /// 提交中
    Submitting,
    /// 已完成（草稿随即被丢弃）
    Completed,
}

/// 交付草稿
///
/// 首次选中任务时惰性创建；提交成功或登出时删除；
/// 对应的任务消失时草稿原样保留（孤儿草稿只按键访问，无害）
#[derive(Debug, Clone)]
pub struct Draft {
    pub key: DraftKey,
    pub title: String,
    pub content: String,
    pub address: String,
    pub supplement: String,
    pub attachments: Vec<Attachment>,
    pub phase: SubmitPhase,
}

impl Draft {
    pub fn new(key: DraftKey) -> Self {
        Self {
            key,
            title: String::new(),
            content: String::new(),
            address: String::new(),
            supplement: String::new(),
            attachments: Vec::new(),
            phase: SubmitPhase::Editing,
        }
    }

    /// 某一类别附件的当前数量
    pub fn count_of_kind(&self, kind: AttachmentKind) -> usize {
        self.attachments.iter().filter(|a| a.kind == kind).count()
    }

    pub fn attachment(&self, id: u64) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.id == id)
    }
}
