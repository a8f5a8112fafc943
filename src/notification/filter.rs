//! 通知规则过滤

use crate::model::{NotificationRule, TaskStatus};

/// 规则过滤结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Send,
    Skip(&'static str),
}

impl FilterDecision {
    pub fn should_send(&self) -> bool {
        matches!(self, FilterDecision::Send)
    }
}

/// 任务状态通知：订阅了当前状态，或状态已变化且订阅了 `changed`
pub fn filter_task_rule(
    rule: &NotificationRule,
    status: TaskStatus,
    status_changed: bool,
) -> FilterDecision {
    if !rule.enabled {
        return FilterDecision::Skip("disabled");
    }
    if rule.subscribes_status(status) || (status_changed && rule.subscribes_status_changed()) {
        FilterDecision::Send
    } else {
        FilterDecision::Skip("status not subscribed")
    }
}

/// 审批请求通知：只看 `waitforapprove`
pub fn filter_approval_rule(rule: &NotificationRule) -> FilterDecision {
    if !rule.enabled {
        return FilterDecision::Skip("disabled");
    }
    if rule.subscribes_approval() {
        FilterDecision::Send
    } else {
        FilterDecision::Skip("approval not subscribed")
    }
}
