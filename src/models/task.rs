use crate::models::wire::TaskRecord;

/// 任务快照
///
/// 来自后端任务列表的不可变快照，进入队列后不再更新
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub task_id: i64,
    /// 分派记录ID，(手机号, 分派ID) 唯一定位一份草稿
    pub assignment_id: i64,
    pub staff_id: i64,
    pub title: String,
    pub description: String,
    pub min_cost: f64,
    pub max_cost: f64,
    /// 后端的 myStatus 标记
    pub status: i64,
}

impl Task {
    /// 费用区间展示文本
    pub fn cost_range(&self) -> String {
        format!("{}-{}", self.min_cost, self.max_cost)
    }

    /// 是否为测试任务（标题带测试标记的任务不进入队列）
    pub fn is_test_marked(&self) -> bool {
        self.title.contains("测试") || self.title.to_lowercase().contains("test")
    }

    /// 是否可交付
    pub fn is_deliverable(&self, deliverable_status: i64) -> bool {
        self.status == deliverable_status && !self.is_test_marked()
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self {
            task_id: record.task_id,
            assignment_id: record.task_assign_id,
            staff_id: record.task_staff_id,
            title: record.task_name,
            description: record.task_desc,
            min_cost: record.min_cost,
            max_cost: record.max_cost,
            status: record.my_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_with_title(title: &str, status: i64) -> Task {
        Task {
            task_id: 1,
            assignment_id: 11,
            staff_id: 111,
            title: title.to_string(),
            description: String::new(),
            min_cost: 10.0,
            max_cost: 20.0,
            status,
        }
    }

    #[test]
    fn test_test_marked_titles() {
        assert!(task_with_title("商场测试巡检", 2).is_test_marked());
        assert!(task_with_title("Test run", 2).is_test_marked());
        assert!(task_with_title("TEST任务", 2).is_test_marked());
        assert!(!task_with_title("商场巡检", 2).is_test_marked());
    }

    #[test]
    fn test_deliverable() {
        assert!(task_with_title("商场巡检", 2).is_deliverable(2));
        assert!(!task_with_title("商场巡检", 3).is_deliverable(2));
        assert!(!task_with_title("测试巡检", 2).is_deliverable(2));
    }
}
