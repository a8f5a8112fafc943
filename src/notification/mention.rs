//! @ 提醒内容

use std::collections::BTreeSet;

use super::format::{msg, FormatRule};
use crate::model::{NotificationRule, WebhookType, AT_ALL};

/// 按机器人类型生成 @ 内容，未配置时为空字符串
///
/// - 钉钉：`**相关人员**: @138xxx@139xxx` 信息行（实际提醒靠 payload 的 `at` 字段）
/// - 企业微信：去重排序后的 `<@userid>` 信息行
/// - 飞书：去重排序后的 `<at user_id="..."></at>`，作为卡片之后的单独文本消息发送
pub fn mention_content(rule: &NotificationRule) -> String {
    let format = FormatRule::for_webhook(rule.webhook_type);
    match rule.webhook_type {
        WebhookType::Dingding => {
            let mut tokens: Vec<String> = rule
                .at_mobiles
                .iter()
                .filter(|m| m.as_str() != AT_ALL)
                .map(|m| format!("@{}", m))
                .collect();
            if rule.at_all() {
                tokens.push(format!("@{}", msg::AT_ALL_NAME));
            }
            if tokens.is_empty() {
                return String::new();
            }
            format!("{}**{}**: {} \n", format.line_prefix, msg::MENTIONS, tokens.concat())
        }
        WebhookType::Wechat => {
            let ids = sorted_ids(&rule.wechat_user_ids, rule.at_all());
            if ids.is_empty() {
                return String::new();
            }
            let tokens: Vec<String> = ids.iter().map(|id| format!("<@{}>", id)).collect();
            format!("{}**{}**: {} \n", format.line_prefix, msg::MENTIONS, tokens.join(" "))
        }
        WebhookType::Feishu => sorted_ids(&rule.lark_user_ids, rule.at_all())
            .iter()
            .map(|id| {
                if *id == AT_ALL {
                    format!("<at user_id=\"{}\">{}</at>", AT_ALL, msg::AT_ALL_NAME)
                } else {
                    format!("<at user_id=\"{}\"></at>", id)
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

/// 钉钉 payload 中的 `atMobiles`（排除 `all`）
pub fn dingding_at_mobiles(rule: &NotificationRule) -> Vec<String> {
    rule.at_mobiles
        .iter()
        .filter(|m| m.as_str() != AT_ALL)
        .cloned()
        .collect()
}

fn sorted_ids(ids: &[String], at_all: bool) -> BTreeSet<&str> {
    let mut set: BTreeSet<&str> = ids
        .iter()
        .map(String::as_str)
        .filter(|id| !id.is_empty())
        .collect();
    if at_all {
        set.insert(AT_ALL);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(webhook_type: WebhookType) -> NotificationRule {
        NotificationRule::new(webhook_type, "https://hook")
    }

    #[test]
    fn test_empty_mentions() {
        for t in [WebhookType::Dingding, WebhookType::Wechat, WebhookType::Feishu] {
            assert_eq!(mention_content(&rule(t)), "");
        }
    }

    #[test]
    fn test_dingding_mentions() {
        let mut r = rule(WebhookType::Dingding);
        r.at_mobiles = vec!["13800000000".to_string(), "13900000000".to_string()];
        assert_eq!(
            mention_content(&r),
            "##### **相关人员**: @13800000000@13900000000 \n"
        );

        r.at_mobiles.push("all".to_string());
        assert!(mention_content(&r).contains("@所有人"));
        assert_eq!(dingding_at_mobiles(&r).len(), 2);
    }

    #[test]
    fn test_wechat_mentions_sorted_and_deduplicated() {
        let mut r = rule(WebhookType::Wechat);
        r.wechat_user_ids = vec!["zoe".to_string(), "bob".to_string(), "zoe".to_string()];
        assert_eq!(mention_content(&r), "**相关人员**: <@bob> <@zoe> \n");
    }

    #[test]
    fn test_feishu_mentions() {
        let mut r = rule(WebhookType::Feishu);
        r.lark_user_ids = vec!["ou_2".to_string(), "ou_1".to_string()];
        r.is_at_all = true;
        assert_eq!(
            mention_content(&r),
            "<at user_id=\"all\">所有人</at> <at user_id=\"ou_1\"></at> <at user_id=\"ou_2\"></at>"
        );
    }
}
