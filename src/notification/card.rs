//! 飞书交互式消息卡片
//!
//! 结构：header（颜色 + 标题）、按顺序排列的 lark_md 字段块、一个跳转按钮。

use serde::{Deserialize, Serialize};

const TAG_PLAIN_TEXT: &str = "plain_text";
const TAG_LARK_MD: &str = "lark_md";

/// 飞书消息卡片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LarkCard {
    pub config: CardConfig,
    pub header: CardHeader,
    pub i18n_elements: I18nElements,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub wide_screen_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardHeader {
    pub template: String,
    pub title: CardText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardText {
    pub tag: String,
    pub content: String,
}

impl CardText {
    fn plain(content: impl Into<String>) -> Self {
        Self {
            tag: TAG_PLAIN_TEXT.to_string(),
            content: content.into(),
        }
    }

    fn lark_md(content: impl Into<String>) -> Self {
        Self {
            tag: TAG_LARK_MD.to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct I18nElements {
    pub zh_cn: Vec<CardElement>,
}

/// 卡片元素
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "snake_case")]
pub enum CardElement {
    Div { fields: Vec<CardField> },
    Action { actions: Vec<CardButton> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardField {
    pub is_short: bool,
    pub text: CardText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardButton {
    pub tag: String,
    pub text: CardText,
    #[serde(rename = "type")]
    pub button_type: String,
    pub url: String,
}

impl LarkCard {
    pub fn new(template: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            config: CardConfig {
                wide_screen_mode: true,
            },
            header: CardHeader {
                template: template.into(),
                title: CardText::plain(title),
            },
            i18n_elements: I18nElements::default(),
        }
    }

    /// 添加 lark_md 字段；`new_div` 为 true 时开启新的 div，否则追加到上一个 div
    pub fn add_field(&mut self, content: impl Into<String>, new_div: bool) {
        let field = CardField {
            is_short: false,
            text: CardText::lark_md(content),
        };
        if !new_div {
            if let Some(CardElement::Div { fields }) = self.i18n_elements.zh_cn.last_mut() {
                fields.push(field);
                return;
            }
        }
        self.i18n_elements.zh_cn.push(CardElement::Div {
            fields: vec![field],
        });
    }

    /// 添加跳转按钮
    pub fn add_action(&mut self, text: impl Into<String>, url: impl Into<String>) {
        self.i18n_elements.zh_cn.push(CardElement::Action {
            actions: vec![CardButton {
                tag: "button".to_string(),
                text: CardText::plain(text),
                button_type: "default".to_string(),
                url: url.into(),
            }],
        });
    }

    pub fn header_template(&self) -> &str {
        &self.header.template
    }

    pub fn title(&self) -> &str {
        &self.header.title.content
    }

    /// 所有字段内容（按顺序）
    pub fn field_texts(&self) -> Vec<&str> {
        self.i18n_elements
            .zh_cn
            .iter()
            .filter_map(|e| match e {
                CardElement::Div { fields } => Some(fields),
                CardElement::Action { .. } => None,
            })
            .flatten()
            .map(|f| f.text.content.as_str())
            .collect()
    }

    /// 第一个按钮的链接
    pub fn action_url(&self) -> Option<&str> {
        self.i18n_elements.zh_cn.iter().find_map(|e| match e {
            CardElement::Action { actions } => actions.first().map(|b| b.url.as_str()),
            CardElement::Div { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_fields_group_into_divs() {
        let mut card = LarkCard::new("green", "title");
        card.add_field("a", true);
        card.add_field("b", false);
        card.add_field("c", true);
        card.add_action("more", "https://ci/x");

        assert_eq!(card.i18n_elements.zh_cn.len(), 3);
        assert_eq!(card.field_texts(), vec!["a", "b", "c"]);
        assert_eq!(card.action_url(), Some("https://ci/x"));
    }

    #[test]
    fn test_card_json_shape() {
        let mut card = LarkCard::new("red", "⚠️ 工作流 demo #1 执行失败");
        card.add_field("**项目名称**：demo \n", true);
        card.add_action("点击查看更多信息", "https://ci/x");

        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["config"]["wide_screen_mode"], true);
        assert_eq!(json["header"]["template"], "red");
        assert_eq!(json["header"]["title"]["tag"], "plain_text");
        let elements = &json["i18n_elements"]["zh_cn"];
        assert_eq!(elements[0]["tag"], "div");
        assert_eq!(elements[0]["fields"][0]["text"]["tag"], "lark_md");
        assert_eq!(elements[1]["tag"], "action");
        assert_eq!(elements[1]["actions"][0]["type"], "default");
        assert_eq!(elements[1]["actions"][0]["url"], "https://ci/x");
    }
}
