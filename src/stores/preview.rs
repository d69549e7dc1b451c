//! 图片预览句柄登记处
//!
//! 预览句柄是一种短暂的本地资源：图片附件入队时分配，
//! 附件移除、草稿丢弃或整体登出时必须恰好释放一次。
//! 这里集中分配和回收，杜绝重复释放和泄漏。

use crate::models::PreviewHandle;
use std::collections::HashMap;
use tracing::{debug, warn};

/// 预览句柄登记处
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    next_id: u64,
    /// 尚未释放的句柄: id -> 预览URL
    live: HashMap<u64, String>,
    /// 每个 id 的累计释放次数（正常情况下恒为 1）
    release_counts: HashMap<u64, u32>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为图片分配预览句柄
    pub fn create(&mut self, file_name: &str) -> PreviewHandle {
        self.next_id += 1;
        let id = self.next_id;
        let url = format!("preview://{}/{}", id, file_name);
        self.live.insert(id, url.clone());
        debug!("创建预览句柄 {} ({})", id, file_name);
        PreviewHandle { id, url }
    }

    /// 释放句柄
    ///
    /// 重复释放会被忽略并记录警告，不会计入释放次数
    pub fn release(&mut self, id: u64) {
        if self.live.remove(&id).is_some() {
            *self.release_counts.entry(id).or_insert(0) += 1;
            debug!("释放预览句柄 {}", id);
        } else if self.release_counts.contains_key(&id) {
            warn!("预览句柄 {} 已释放过，忽略重复释放", id);
        } else {
            warn!("预览句柄 {} 不存在，忽略释放请求", id);
        }
    }

    /// 尚未释放的句柄数量
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// 某个句柄的累计释放次数
    pub fn release_count(&self, id: u64) -> u32 {
        self.release_counts.get(&id).copied().unwrap_or(0)
    }
}
