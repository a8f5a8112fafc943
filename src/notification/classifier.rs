//! 状态变化判定

use tracing::warn;

use crate::model::{TaskSnapshot, TaskStatus};
use crate::store::TaskStore;

/// 判断当前任务相对上一次任务是否发生了状态变化
///
/// `previous` 为 None 表示上一次任务查不到（不存在或查询出错），此时按已变化处理。
/// 状态为 running 时不算变化；刚创建的任务永远不算变化。
pub fn is_status_changed(current: TaskStatus, previous: Option<TaskStatus>) -> bool {
    if current == TaskStatus::Created {
        return false;
    }
    match previous {
        None => true,
        Some(previous) => current != previous && current != TaskStatus::Running,
    }
}

/// 查询上一次任务（task_id - 1）并判定状态变化，查询失败不会返回错误
pub fn classify(tasks: &dyn TaskStore, task: &TaskSnapshot) -> bool {
    let previous = match tasks.find_task(&task.workflow_name, task.task_id - 1) {
        Ok(prev) => Some(prev.status),
        Err(e) => {
            warn!(
                workflow = %task.workflow_name,
                task_id = task.task_id,
                error = %e,
                "Failed to find previous task, treating status as changed"
            );
            None
        }
    };
    is_status_changed(task.status, previous)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotifyError;

    #[test]
    fn test_lookup_failure_is_changed() {
        assert!(is_status_changed(TaskStatus::Passed, None));
        assert!(is_status_changed(TaskStatus::Running, None));
    }

    #[test]
    fn test_created_is_never_changed() {
        assert!(!is_status_changed(TaskStatus::Created, None));
        assert!(!is_status_changed(TaskStatus::Created, Some(TaskStatus::Failed)));
        assert!(!is_status_changed(TaskStatus::Created, Some(TaskStatus::Created)));
    }

    #[test]
    fn test_running_is_not_changed() {
        assert!(!is_status_changed(TaskStatus::Running, Some(TaskStatus::Passed)));
    }

    #[test]
    fn test_terminal_transition() {
        assert!(is_status_changed(TaskStatus::Failed, Some(TaskStatus::Passed)));
        assert!(!is_status_changed(TaskStatus::Passed, Some(TaskStatus::Passed)));
    }

    struct ErrStore;

    impl TaskStore for ErrStore {
        fn find_task(&self, _workflow_name: &str, _task_id: i64) -> Result<TaskSnapshot, NotifyError> {
            Err(NotifyError::Lookup("connection reset".to_string()))
        }
    }

    #[test]
    fn test_classify_degrades_on_store_error() {
        let task = TaskSnapshot {
            workflow_name: "wf".to_string(),
            workflow_display_name: "wf".to_string(),
            task_id: 2,
            project_name: "p".to_string(),
            task_creator: "u".to_string(),
            start_time: 0,
            status: TaskStatus::Passed,
            stages: vec![],
        };
        assert!(classify(&ErrStore, &task));
    }
}
