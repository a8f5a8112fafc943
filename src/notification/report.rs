//! 单次通知调用的结果汇总

use serde::Serialize;

use crate::model::WebhookType;

/// 单条规则的发送结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", content = "reason", rename_all = "lowercase")]
pub enum SendResult {
    /// 发送成功
    Sent,
    /// 跳过（未启用 / 未订阅 / dry-run）
    Skipped(String),
    /// 生成或发送失败
    Failed(String),
}

/// 规则结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleOutcome {
    /// 规则在工作流定义中的下标
    pub index: usize,
    pub webhook_type: WebhookType,
    pub result: SendResult,
}

/// 一次通知调用的汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotifyReport {
    pub workflow_name: String,
    pub task_id: i64,
    pub outcomes: Vec<RuleOutcome>,
}

impl NotifyReport {
    pub fn new(workflow_name: impl Into<String>, task_id: i64) -> Self {
        Self {
            workflow_name: workflow_name.into(),
            task_id,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, index: usize, webhook_type: WebhookType, result: SendResult) {
        self.outcomes.push(RuleOutcome {
            index,
            webhook_type,
            result,
        });
    }

    pub fn sent_count(&self) -> usize {
        self.count(|r| matches!(r, SendResult::Sent))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|r| matches!(r, SendResult::Skipped(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|r| matches!(r, SendResult::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&SendResult) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.result)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let mut report = NotifyReport::new("wf", 3);
        report.push(0, WebhookType::Dingding, SendResult::Sent);
        report.push(1, WebhookType::Feishu, SendResult::Skipped("disabled".to_string()));
        report.push(2, WebhookType::Wechat, SendResult::Failed("timeout".to_string()));
        report.push(3, WebhookType::Wechat, SendResult::Sent);

        assert_eq!(report.sent_count(), 2);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }
}
