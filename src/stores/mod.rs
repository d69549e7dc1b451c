//! 状态仓库层
//!
//! 子系统全部共享可变状态都集中在 `ConsoleState`：
//! 会话/任务登记处、草稿仓库、预览句柄登记处、当前选中与附件 id 计数器。
//! 生命周期明确：子系统初始化时创建，登出时重置，不存在全局可变状态。

pub mod draft_store;
pub mod preview;
pub mod task_registry;

pub use draft_store::DraftStore;
pub use preview::PreviewRegistry;
pub use task_registry::TaskRegistry;

use crate::models::DraftKey;
use std::sync::{Arc, Mutex};

/// 控制台聚合状态
#[derive(Debug, Default)]
pub struct ConsoleState {
    pub registry: TaskRegistry,
    pub drafts: DraftStore,
    pub previews: PreviewRegistry,
    /// 当前选中的 (工人, 任务)
    pub selection: Option<DraftKey>,
    attachment_seq: u64,
}

impl ConsoleState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 分配全局唯一、永不复用的附件 id
    pub fn next_attachment_id(&mut self) -> u64 {
        self.attachment_seq += 1;
        self.attachment_seq
    }

    /// 重置全部状态：释放所有预览句柄并清空会话、草稿、选中
    ///
    /// 附件 id 计数器刻意不归零，保证 id 跨登录也不复用
    pub fn reset(&mut self) {
        let Self {
            registry,
            drafts,
            previews,
            selection,
            ..
        } = self;
        drafts.clear_all(previews);
        registry.clear();
        *selection = None;
    }
}

/// 单持有、多任务共享的状态句柄
///
/// 锁从不跨 await 持有，所有网络挂起点都在锁外
pub type SharedState = Arc<Mutex<ConsoleState>>;

pub fn shared_state() -> SharedState {
    Arc::new(Mutex::new(ConsoleState::new()))
}

/// 取状态锁；持锁线程 panic 过也照常接管
pub fn lock_state(state: &SharedState) -> std::sync::MutexGuard<'_, ConsoleState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
