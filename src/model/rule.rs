//! 工作流定义中的通知规则

use serde::{Deserialize, Serialize};

use super::status::{TaskStatus, STATUS_CHANGED, STATUS_WAITING_APPROVE};

/// 提及全部成员的特殊标识
pub const AT_ALL: &str = "all";

/// Webhook 机器人类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookType {
    /// 钉钉
    Dingding,
    /// 飞书
    Feishu,
    /// 企业微信
    Wechat,
}

impl WebhookType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookType::Dingding => "dingding",
            WebhookType::Feishu => "feishu",
            WebhookType::Wechat => "wechat",
        }
    }
}

impl std::fmt::Display for WebhookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 工作流定义（只关心通知规则）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub notify_ctls: Vec<NotificationRule>,
}

/// 单条通知规则
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRule {
    #[serde(default)]
    pub enabled: bool,
    pub webhook_type: WebhookType,
    #[serde(default)]
    pub dingding_webhook: String,
    #[serde(default)]
    pub feishu_webhook: String,
    #[serde(default)]
    pub wechat_webhook: String,
    /// 钉钉加签密钥
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    /// 订阅的状态（含 `changed` / `waitforapprove` 伪状态）
    #[serde(default)]
    pub notify_types: Vec<String>,
    /// 钉钉 @ 手机号
    #[serde(default)]
    pub at_mobiles: Vec<String>,
    /// 企业微信 @ 用户
    #[serde(default)]
    pub wechat_user_ids: Vec<String>,
    /// 飞书 @ 用户
    #[serde(default)]
    pub lark_user_ids: Vec<String>,
    #[serde(default)]
    pub is_at_all: bool,
}

impl NotificationRule {
    pub fn new(webhook_type: WebhookType, url: impl Into<String>) -> Self {
        let url = url.into();
        let mut rule = Self {
            enabled: true,
            webhook_type,
            dingding_webhook: String::new(),
            feishu_webhook: String::new(),
            wechat_webhook: String::new(),
            secret: None,
            notify_types: Vec::new(),
            at_mobiles: Vec::new(),
            wechat_user_ids: Vec::new(),
            lark_user_ids: Vec::new(),
            is_at_all: false,
        };
        match webhook_type {
            WebhookType::Dingding => rule.dingding_webhook = url,
            WebhookType::Feishu => rule.feishu_webhook = url,
            WebhookType::Wechat => rule.wechat_webhook = url,
        }
        rule
    }

    /// 设置订阅状态
    pub fn with_notify_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.notify_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// 当前机器人类型对应的 webhook 地址
    pub fn webhook_url(&self) -> &str {
        match self.webhook_type {
            WebhookType::Dingding => &self.dingding_webhook,
            WebhookType::Feishu => &self.feishu_webhook,
            WebhookType::Wechat => &self.wechat_webhook,
        }
    }

    /// 当前机器人类型对应的 @ 列表
    pub fn mentions(&self) -> &[String] {
        match self.webhook_type {
            WebhookType::Dingding => &self.at_mobiles,
            WebhookType::Feishu => &self.lark_user_ids,
            WebhookType::Wechat => &self.wechat_user_ids,
        }
    }

    /// 是否 @ 所有人（显式开关或列表中包含 `all`）
    pub fn at_all(&self) -> bool {
        self.is_at_all || self.mentions().iter().any(|m| m == AT_ALL)
    }

    fn subscribes(&self, value: &str) -> bool {
        self.notify_types.iter().any(|t| t == value)
    }

    pub fn subscribes_status(&self, status: TaskStatus) -> bool {
        self.subscribes(status.as_str())
    }

    pub fn subscribes_status_changed(&self) -> bool {
        self.subscribes(STATUS_CHANGED)
    }

    pub fn subscribes_approval(&self) -> bool {
        self.subscribes(STATUS_WAITING_APPROVE)
    }
}
