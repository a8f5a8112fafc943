//! Webhook 发送层
//!
//! `WebhookTransport` 是通知核心与 HTTP 之间的接缝，测试中替换为记录型 mock。
//! `HttpTransport` 基于 reqwest blocking client，每个请求都有显式超时。

use std::time::Duration;

use base64::Engine;
use hmac::{Hmac, Mac};
use reqwest::blocking::Client;
use serde::Deserialize;
use sha2::Sha256;
use tracing::{debug, warn};

use super::card::LarkCard;
use crate::error::NotifyError;
use crate::model::{NotificationRule, WebhookType};

/// 发送目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEndpoint {
    pub provider: WebhookType,
    pub url: String,
    /// 钉钉 / 飞书加签密钥
    pub secret: Option<String>,
}

impl WebhookEndpoint {
    pub fn from_rule(rule: &NotificationRule) -> Self {
        Self {
            provider: rule.webhook_type,
            url: rule.webhook_url().to_string(),
            secret: rule.secret.clone().filter(|s| !s.is_empty()),
        }
    }
}

/// 各机器人的请求体
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookPayload {
    /// 钉钉 markdown
    DingdingMarkdown {
        title: String,
        text: String,
        at_mobiles: Vec<String>,
        is_at_all: bool,
    },
    /// 企业微信 markdown
    WechatMarkdown { content: String },
    /// 飞书交互式卡片
    FeishuCard(LarkCard),
    /// 飞书纯文本
    FeishuText { text: String },
}

impl WebhookPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookPayload::DingdingMarkdown { .. } => "dingding_markdown",
            WebhookPayload::WechatMarkdown { .. } => "wechat_markdown",
            WebhookPayload::FeishuCard(_) => "feishu_card",
            WebhookPayload::FeishuText { .. } => "feishu_text",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            WebhookPayload::DingdingMarkdown {
                title,
                text,
                at_mobiles,
                is_at_all,
            } => serde_json::json!({
                "msgtype": "markdown",
                "markdown": { "title": title, "text": text },
                "at": { "atMobiles": at_mobiles, "isAtAll": is_at_all },
            }),
            WebhookPayload::WechatMarkdown { content } => serde_json::json!({
                "msgtype": "markdown",
                "markdown": { "content": content },
            }),
            WebhookPayload::FeishuCard(card) => serde_json::json!({
                "msg_type": "interactive",
                "card": card,
            }),
            WebhookPayload::FeishuText { text } => serde_json::json!({
                "msg_type": "text",
                "content": { "text": text },
            }),
        }
    }
}

/// Webhook 发送接口
pub trait WebhookTransport: Send + Sync {
    fn send(&self, endpoint: &WebhookEndpoint, payload: &WebhookPayload) -> Result<(), NotifyError>;
}

/// 机器人返回体：钉钉 / 企业微信用 errcode，飞书用 code
#[derive(Debug, Default, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    errcode: Option<i64>,
    #[serde(default)]
    errmsg: Option<String>,
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    msg: Option<String>,
}

impl ProviderResponse {
    fn error(&self) -> Option<String> {
        match (self.errcode, self.code) {
            (Some(code), _) if code != 0 => Some(format!(
                "errcode {}: {}",
                code,
                self.errmsg.as_deref().unwrap_or("")
            )),
            (_, Some(code)) if code != 0 => Some(format!(
                "code {}: {}",
                code,
                self.msg.as_deref().unwrap_or("")
            )),
            _ => None,
        }
    }
}

/// HTTP 发送实现
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl WebhookTransport for HttpTransport {
    fn send(&self, endpoint: &WebhookEndpoint, payload: &WebhookPayload) -> Result<(), NotifyError> {
        let provider = endpoint.provider.as_str();
        let transport_err = |reason: String| NotifyError::Transport { provider, reason };

        if endpoint.url.is_empty() {
            return Err(transport_err("webhook url is empty".to_string()));
        }

        let mut url = endpoint.url.clone();
        let mut body = payload.to_json();
        if let Some(secret) = &endpoint.secret {
            match endpoint.provider {
                WebhookType::Dingding => {
                    let timestamp = chrono::Utc::now().timestamp_millis();
                    let sign = dingding_sign(secret, timestamp).map_err(transport_err)?;
                    let sep = if url.contains('?') { '&' } else { '?' };
                    url = format!("{}{}timestamp={}&sign={}", url, sep, timestamp, sign);
                }
                WebhookType::Feishu => {
                    let timestamp = chrono::Utc::now().timestamp();
                    let sign = feishu_sign(secret, timestamp).map_err(transport_err)?;
                    body["timestamp"] = serde_json::json!(timestamp.to_string());
                    body["sign"] = serde_json::json!(sign);
                }
                WebhookType::Wechat => {}
            }
        }

        debug!(provider, kind = payload.kind(), "Posting webhook message");
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| transport_err(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let text = response.text().unwrap_or_default();
        if !status.is_success() {
            return Err(transport_err(format!("HTTP {}: {}", status.as_u16(), text)));
        }

        let parsed: ProviderResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(provider, error = %e, "Unparseable webhook response, treating as delivered");
                ProviderResponse::default()
            }
        };
        match parsed.error() {
            Some(reason) => Err(transport_err(reason)),
            None => Ok(()),
        }
    }
}

fn hmac_base64(key: &[u8], message: &[u8]) -> Result<String, String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).map_err(|e| format!("invalid HMAC key: {}", e))?;
    mac.update(message);
    Ok(base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
}

/// 钉钉加签：`HmacSHA256(secret, "{timestamp_ms}\n{secret}")`，Base64 后再做 URL 编码
pub fn dingding_sign(secret: &str, timestamp_ms: i64) -> Result<String, String> {
    let string_to_sign = format!("{}\n{}", timestamp_ms, secret);
    let sign = hmac_base64(secret.as_bytes(), string_to_sign.as_bytes())?;
    Ok(urlencoding::encode(&sign).into_owned())
}

/// 飞书加签：以 `"{timestamp}\n{secret}"` 为 key 对空串做 HmacSHA256，再 Base64
pub fn feishu_sign(secret: &str, timestamp: i64) -> Result<String, String> {
    let string_to_sign = format!("{}\n{}", timestamp, secret);
    hmac_base64(string_to_sign.as_bytes(), b"")
}
