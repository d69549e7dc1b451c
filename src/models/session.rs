use crate::models::task::Task;

/// 工人会话
///
/// 登录成功后创建；刷新时整体替换任务队列；登出时销毁
#[derive(Debug, Clone)]
pub struct WorkerSession {
    /// 11位手机号
    pub phone: String,
    /// 登录 accessToken，刷新时复用，不重新登录
    pub token: String,
    /// 展示名，工人信息拉取失败时回落为手机号
    pub display_name: String,
    /// 待交付任务队列，只保留可交付且非测试标记的任务
    pub tasks: Vec<Task>,
}

impl WorkerSession {
    pub fn first_task(&self) -> Option<&Task> {
        self.tasks.first()
    }

    pub fn has_tasks(&self) -> bool {
        !self.tasks.is_empty()
    }
}
