//! 通知分发器 - 按机器人类型选择发送路径

use std::sync::Arc;

use tracing::{info, warn};

use super::composer::ComposedMessage;
use super::mention::{dingding_at_mobiles, mention_content};
use super::report::SendResult;
use super::transport::{WebhookEndpoint, WebhookPayload, WebhookTransport};
use crate::error::NotifyError;
use crate::model::{NotificationRule, WebhookType};

/// 通知分发器
///
/// - 钉钉：markdown 消息，@ 信息放在 payload 的 `at` 字段
/// - 飞书：先发卡片，再单独发送一条 @ 文本消息
/// - 企业微信：markdown 消息
pub struct NotificationDispatcher {
    transport: Arc<dyn WebhookTransport>,
    /// 是否为 dry-run 模式
    dry_run: bool,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn WebhookTransport>) -> Self {
        Self {
            transport,
            dry_run: false,
        }
    }

    /// 设置 dry-run 模式
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// 发送一条已生成的消息，发送失败返回错误，由调用方决定是否继续
    pub fn dispatch(
        &self,
        rule: &NotificationRule,
        message: &ComposedMessage,
    ) -> Result<SendResult, NotifyError> {
        let payloads = build_payloads(rule, message)?;
        let endpoint = WebhookEndpoint::from_rule(rule);

        if self.dry_run {
            info!(
                webhook_type = %rule.webhook_type,
                payloads = payloads.len(),
                "[DRY-RUN] Would send notification"
            );
            return Ok(SendResult::Skipped("dry-run".to_string()));
        }

        for payload in &payloads {
            if let Err(e) = self.transport.send(&endpoint, payload) {
                warn!(
                    webhook_type = %rule.webhook_type,
                    kind = payload.kind(),
                    error = %e,
                    "Webhook send failed"
                );
                return Err(e);
            }
        }

        info!(webhook_type = %rule.webhook_type, "Notification sent");
        Ok(SendResult::Sent)
    }
}

/// 按机器人类型把消息转成请求体
pub fn build_payloads(
    rule: &NotificationRule,
    message: &ComposedMessage,
) -> Result<Vec<WebhookPayload>, NotifyError> {
    match (rule.webhook_type, message) {
        (WebhookType::Dingding, ComposedMessage::Markdown { title, content }) => {
            Ok(vec![WebhookPayload::DingdingMarkdown {
                title: title.clone(),
                text: content.clone(),
                at_mobiles: dingding_at_mobiles(rule),
                is_at_all: rule.at_all(),
            }])
        }
        (WebhookType::Feishu, ComposedMessage::Card(card)) => {
            let mut payloads = vec![WebhookPayload::FeishuCard(card.clone())];
            let mentions = mention_content(rule);
            if !mentions.is_empty() {
                payloads.push(WebhookPayload::FeishuText { text: mentions });
            }
            Ok(payloads)
        }
        (WebhookType::Wechat, ComposedMessage::Markdown { content, .. }) => {
            Ok(vec![WebhookPayload::WechatMarkdown {
                content: content.clone(),
            }])
        }
        (webhook_type, _) => Err(NotifyError::Config(format!(
            "message form does not match webhook type {}",
            webhook_type
        ))),
    }
}
