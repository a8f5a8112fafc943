//! 任务状态
//!
//! 字符串形式与上游执行引擎保持一致，通知规则的订阅列表按字符串精确匹配。

use serde::{Deserialize, Serialize};

/// 工作流任务 / Job 状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Created,
    Running,
    Passed,
    Failed,
    Timeout,
    Cancelled,
    Reject,
    Prepare,
    Queued,
    Blocked,
    Skipped,
    Disabled,
    Paused,
    #[serde(rename = "waitforapprove")]
    WaitingApprove,
    /// 未运行（Job 尚未开始时状态为空字符串）
    #[default]
    #[serde(rename = "")]
    NotRun,
}

/// 订阅用伪状态：任意终态变化
pub const STATUS_CHANGED: &str = "changed";
/// 订阅用伪状态：等待审批
pub const STATUS_WAITING_APPROVE: &str = "waitforapprove";

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Running => "running",
            TaskStatus::Passed => "passed",
            TaskStatus::Failed => "failed",
            TaskStatus::Timeout => "timeout",
            TaskStatus::Cancelled => "cancelled",
            TaskStatus::Reject => "reject",
            TaskStatus::Prepare => "prepare",
            TaskStatus::Queued => "queued",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Disabled => "disabled",
            TaskStatus::Paused => "paused",
            TaskStatus::WaitingApprove => STATUS_WAITING_APPROVE,
            TaskStatus::NotRun => "",
        }
    }

    /// 正向状态（成功或刚创建）
    pub fn is_positive(&self) -> bool {
        matches!(self, TaskStatus::Passed | TaskStatus::Created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_matches_as_str() {
        for status in [
            TaskStatus::Created,
            TaskStatus::Passed,
            TaskStatus::Failed,
            TaskStatus::WaitingApprove,
            TaskStatus::NotRun,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn test_empty_status_is_not_run() {
        let status: TaskStatus = serde_json::from_str("\"\"").unwrap();
        assert_eq!(status, TaskStatus::NotRun);
        assert_eq!(TaskStatus::default(), TaskStatus::NotRun);
    }

    #[test]
    fn test_is_positive() {
        assert!(TaskStatus::Passed.is_positive());
        assert!(TaskStatus::Created.is_positive());
        assert!(!TaskStatus::Failed.is_positive());
        assert!(!TaskStatus::Running.is_positive());
    }
}
