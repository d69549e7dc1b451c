//! 工人会话与任务队列登记处
//!
//! 持有全部 WorkerSession（按认证结果顺序），
//! 并实现任务移除后的下一个选中策略。

use crate::models::{DraftKey, Task, WorkerSession};
use tracing::debug;

/// 任务登记处
#[derive(Debug, Default)]
pub struct TaskRegistry {
    sessions: Vec<WorkerSession>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 整体替换会话列表（认证完成后调用）
    pub fn replace_sessions(&mut self, sessions: Vec<WorkerSession>) {
        self.sessions = sessions;
    }

    pub fn sessions(&self) -> &[WorkerSession] {
        &self.sessions
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn session(&self, phone: &str) -> Option<&WorkerSession> {
        self.sessions.iter().find(|s| s.phone == phone)
    }

    pub fn token_of(&self, phone: &str) -> Option<String> {
        self.session(phone).map(|s| s.token.clone())
    }

    pub fn find_task(&self, phone: &str, assignment_id: i64) -> Option<&Task> {
        self.session(phone)
            .and_then(|s| s.tasks.iter().find(|t| t.assignment_id == assignment_id))
    }

    /// 从工人队列中移除任务，返回是否命中
    pub fn remove_task(&mut self, phone: &str, assignment_id: i64) -> bool {
        let Some(session) = self.sessions.iter_mut().find(|s| s.phone == phone) else {
            return false;
        };
        let before = session.tasks.len();
        session.tasks.retain(|t| t.assignment_id != assignment_id);
        let hit = session.tasks.len() != before;
        if hit {
            debug!("移除任务 {}/{}，剩余 {} 个", phone, assignment_id, session.tasks.len());
        }
        hit
    }

    /// 整体替换某个工人的任务队列（刷新时调用）
    pub fn replace_queue(&mut self, phone: &str, tasks: Vec<Task>) -> bool {
        match self.sessions.iter_mut().find(|s| s.phone == phone) {
            Some(session) => {
                session.tasks = tasks;
                true
            }
            None => false,
        }
    }

    /// 任务移除后的下一个选中策略
    ///
    /// 1. 优先同一工人队列的新首个任务
    /// 2. 否则按会话顺序取第一个队列非空的工人的首个任务
    /// 3. 都没有则无选中
    pub fn next_selection(&self, prefer_phone: &str) -> Option<DraftKey> {
        if let Some(session) = self.session(prefer_phone) {
            if let Some(task) = session.first_task() {
                return Some(DraftKey::new(&session.phone, task.assignment_id));
            }
        }
        self.first_selection()
    }

    /// 按会话顺序取第一个队列非空工人的首个任务（认证后的默认选中）
    pub fn first_selection(&self) -> Option<DraftKey> {
        self.sessions
            .iter()
            .find(|s| s.has_tasks())
            .and_then(|s| s.first_task().map(|t| DraftKey::new(&s.phone, t.assignment_id)))
    }

    /// 清空全部会话（登出）
    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
