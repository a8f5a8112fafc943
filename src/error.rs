//! 通知子系统错误类型
//!
//! 三类错误的处理方式不同：
//! - `Lookup`：前序任务查询失败时降级为"状态已变化"，规则查询失败时直接返回
//! - `Render`：内容生成失败，默认中止本次调用剩余规则
//! - `Transport`：发送失败，仅记录日志，继续处理下一条规则

use thiserror::Error;

/// 通知错误
#[derive(Debug, Error)]
pub enum NotifyError {
    /// 工作流 / 任务不存在
    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    /// 数据源读取失败
    #[error("lookup failed: {0}")]
    Lookup(String),

    /// 消息内容生成失败（如 job spec 结构不匹配）
    #[error("render failed for job {job}: {reason}")]
    Render { job: String, reason: String },

    /// Webhook 发送失败
    #[error("{provider} webhook delivery failed: {reason}")]
    Transport { provider: &'static str, reason: String },

    /// 配置错误
    #[error("invalid config: {0}")]
    Config(String),
}

impl NotifyError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        NotifyError::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NotifyError::NotFound { .. })
    }

    /// 是否属于内容生成错误
    pub fn is_render(&self) -> bool {
        matches!(self, NotifyError::Render { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NotifyError::not_found("task", "demo#3");
        assert_eq!(err.to_string(), "task not found: demo#3");
        assert!(err.is_not_found());

        let err = NotifyError::Transport {
            provider: "dingding",
            reason: "timeout".to_string(),
        };
        assert_eq!(err.to_string(), "dingding webhook delivery failed: timeout");
        assert!(!err.is_render());
    }
}
