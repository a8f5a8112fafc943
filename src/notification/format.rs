//! 格式规则表与文案
//!
//! 各机器人的 markdown 方言差异在这里集中成一张静态表，
//! 组装内容时先按 `WebhookType` 取规则，再直接拼接字符串，不做运行期模板求值。

use chrono::{Local, TimeZone};
use tracing::warn;

use crate::model::{JobType, TaskStatus, WebhookType};

/// 通知文案（中文）
pub mod msg {
    pub const WORKFLOW: &str = "工作流";
    pub const CREATOR: &str = "执行用户";
    pub const PROJECT: &str = "项目名称";
    pub const START_TIME: &str = "开始时间";
    pub const DURATION: &str = "持续时间";
    pub const STATUS: &str = "状态";
    pub const REPO_INFO: &str = "代码信息";
    pub const COMMIT_MESSAGE: &str = "提交信息";
    pub const IMAGE: &str = "镜像信息";
    pub const ENV: &str = "环境";
    pub const MENTIONS: &str = "相关人员";
    pub const AT_ALL_NAME: &str = "所有人";
    pub const MORE_INFO: &str = "点击查看更多信息";
    pub const WAITING_APPROVE: &str = "等待审批";

    // 状态
    pub const PASSED: &str = "执行成功";
    pub const CANCELLED: &str = "执行取消";
    pub const TIMEOUT: &str = "执行超时";
    pub const REJECTED: &str = "审批被拒绝";
    pub const STARTED: &str = "开始执行";
    pub const RUNNING: &str = "执行中";
    pub const FAILED: &str = "执行失败";
    pub const NOT_RUN: &str = "未运行";

    // 图标
    pub const ICON_POSITIVE: &str = "👍";
    pub const ICON_NEGATIVE: &str = "⚠️";
}

/// 单个机器人的 markdown 规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRule {
    /// 标题前缀
    pub title_prefix: &'static str,
    /// 信息行前缀
    pub line_prefix: &'static str,
    /// Job 块及详情链接前的分隔线
    pub divider: &'static str,
    /// 标题文字是否用 `<font color>` 着色
    pub colored_title: bool,
    /// 是否使用消息卡片代替 markdown
    pub uses_card: bool,
}

static DINGDING_RULE: FormatRule = FormatRule {
    title_prefix: "#### ",
    line_prefix: "##### ",
    divider: "---\n\n",
    colored_title: false,
    uses_card: false,
};

static WECHAT_RULE: FormatRule = FormatRule {
    title_prefix: "#### ",
    line_prefix: "",
    divider: "",
    colored_title: true,
    uses_card: false,
};

static FEISHU_RULE: FormatRule = FormatRule {
    title_prefix: "",
    line_prefix: "",
    divider: "",
    colored_title: false,
    uses_card: true,
};

impl FormatRule {
    pub fn for_webhook(webhook_type: WebhookType) -> &'static FormatRule {
        match webhook_type {
            WebhookType::Dingding => &DINGDING_RULE,
            WebhookType::Wechat => &WECHAT_RULE,
            WebhookType::Feishu => &FEISHU_RULE,
        }
    }

    /// `**label**：value` 信息行
    pub fn info_line(&self, label: &str, value: &str) -> String {
        format!("{}**{}**：{} \n", self.line_prefix, label, value)
    }
}

/// 状态颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Info,
    Comment,
    Warning,
}

impl StatusColor {
    pub fn from_status(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Passed | TaskStatus::Created => StatusColor::Info,
            TaskStatus::Failed => StatusColor::Warning,
            _ => StatusColor::Comment,
        }
    }

    /// 企业微信 markdown `<font color>` 取值
    pub fn markdown(&self) -> &'static str {
        match self {
            StatusColor::Info => "info",
            StatusColor::Comment => "comment",
            StatusColor::Warning => "warning",
        }
    }

    /// 飞书卡片 header template
    pub fn card_template(&self) -> &'static str {
        match self {
            StatusColor::Info => "green",
            StatusColor::Comment => "grey",
            StatusColor::Warning => "red",
        }
    }
}

pub fn status_icon(status: TaskStatus) -> &'static str {
    if status.is_positive() {
        msg::ICON_POSITIVE
    } else {
        msg::ICON_NEGATIVE
    }
}

pub fn status_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Passed => msg::PASSED,
        TaskStatus::Cancelled => msg::CANCELLED,
        TaskStatus::Timeout => msg::TIMEOUT,
        TaskStatus::Reject => msg::REJECTED,
        TaskStatus::Created => msg::STARTED,
        TaskStatus::Running => msg::RUNNING,
        TaskStatus::WaitingApprove => msg::WAITING_APPROVE,
        TaskStatus::NotRun => msg::NOT_RUN,
        _ => msg::FAILED,
    }
}

pub fn job_type_label(job_type: &JobType) -> &str {
    match job_type {
        JobType::Build => "构建",
        JobType::Deploy => "部署",
        JobType::HelmDeploy => "helm部署",
        JobType::CustomDeploy => "自定义部署",
        JobType::Freestyle => "通用任务",
        JobType::Plugin => "自定义任务",
        JobType::Testing => "测试",
        JobType::Scanning => "代码扫描",
        JobType::DistributeImage => "镜像分发",
        JobType::BlueGreenDeploy => "蓝绿部署",
        JobType::BlueGreenRelease => "蓝绿发布",
        JobType::CanaryDeploy => "金丝雀部署",
        JobType::CanaryRelease => "金丝雀发布",
        JobType::GrayRelease => "灰度发布",
        JobType::GrayRollback => "灰度回滚",
        JobType::K8sPatch => "更新 k8s YAML",
        JobType::IstioRelease => "istio 发布",
        JobType::IstioRollback => "istio 回滚",
        JobType::Jira => "jira 问题状态变更",
        JobType::Nacos => "Nacos 配置变更",
        JobType::Apollo => "Apollo 配置变更",
        JobType::MeegoTransition => "飞书工作项状态变更",
        JobType::Other(raw) => raw,
    }
}

/// 本地时区 `YYYY-MM-DD HH:MM:SS`
pub fn format_start_time(unix_secs: i64) -> String {
    match Local.timestamp_opt(unix_secs, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => unix_secs.to_string(),
    }
}

/// 时长格式：`1h2m3s` / `2m0s` / `45s`，负数降级为 `0s`
pub fn format_duration(secs: i64) -> String {
    if secs < 0 {
        warn!(secs, "Negative task duration, rendering as 0s");
        return "0s".to_string();
    }
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{}m{}s", h, m, s)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rule_table() {
        let dd = FormatRule::for_webhook(WebhookType::Dingding);
        assert_eq!(dd.title_prefix, "#### ");
        assert_eq!(dd.info_line("项目名称", "demo"), "##### **项目名称**：demo \n");
        assert!(!dd.uses_card);

        let feishu = FormatRule::for_webhook(WebhookType::Feishu);
        assert!(feishu.uses_card);
        assert_eq!(feishu.title_prefix, "");

        assert!(FormatRule::for_webhook(WebhookType::Wechat).colored_title);
    }

    #[test]
    fn test_status_color() {
        assert_eq!(StatusColor::from_status(TaskStatus::Passed), StatusColor::Info);
        assert_eq!(StatusColor::from_status(TaskStatus::Created), StatusColor::Info);
        assert_eq!(StatusColor::from_status(TaskStatus::Timeout), StatusColor::Comment);
        assert_eq!(StatusColor::from_status(TaskStatus::Cancelled), StatusColor::Comment);
        assert_eq!(StatusColor::from_status(TaskStatus::Failed), StatusColor::Warning);
        assert_eq!(StatusColor::from_status(TaskStatus::Reject), StatusColor::Comment);
        assert_eq!(StatusColor::Warning.card_template(), "red");
    }

    #[test]
    fn test_icons_and_labels() {
        assert_eq!(status_icon(TaskStatus::Passed), "👍");
        assert_eq!(status_icon(TaskStatus::Failed), "⚠️");
        assert_eq!(status_label(TaskStatus::Failed), "执行失败");
        assert_eq!(status_label(TaskStatus::Paused), "执行失败");
        assert_eq!(status_label(TaskStatus::NotRun), "未运行");
        assert_eq!(job_type_label(&JobType::HelmDeploy), "helm部署");
        assert_eq!(job_type_label(&JobType::Other("sql".to_string())), "sql");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(120), "2m0s");
        assert_eq!(format_duration(3723), "1h2m3s");
        assert_eq!(format_duration(-5), "0s");
    }

    #[test]
    fn test_format_start_time() {
        let expected = Local
            .timestamp_opt(1_700_000_000, 0)
            .unwrap()
            .format("%Y-%m-%d %H:%M:%S")
            .to_string();
        assert_eq!(format_start_time(1_700_000_000), expected);
        assert_eq!(expected.len(), 19);
    }
}
