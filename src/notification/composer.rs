//! 消息内容生成
//!
//! 根据任务快照和通知规则生成标题与正文（钉钉 / 企业微信 markdown），
//! 或者飞书消息卡片。两种形式的信息顺序完全一致。

use super::card::LarkCard;
use super::format::{
    format_duration, format_start_time, job_type_label, msg, status_icon, status_label,
    FormatRule, StatusColor,
};
use super::mention::mention_content;
use crate::error::NotifyError;
use crate::model::{primary_repo, JobSpec, JobTask, NotificationRule, TaskSnapshot};

/// 生成好的消息，每个规则只会是其中一种形式
#[derive(Debug, Clone, PartialEq)]
pub enum ComposedMessage {
    Markdown { title: String, content: String },
    Card(LarkCard),
}

impl ComposedMessage {
    pub fn as_markdown(&self) -> Option<(&str, &str)> {
        match self {
            ComposedMessage::Markdown { title, content } => Some((title, content)),
            ComposedMessage::Card(_) => None,
        }
    }

    pub fn as_card(&self) -> Option<&LarkCard> {
        match self {
            ComposedMessage::Card(card) => Some(card),
            ComposedMessage::Markdown { .. } => None,
        }
    }
}

/// 消息内容生成器
#[derive(Debug, Clone)]
pub struct ContentComposer {
    base_uri: String,
}

impl ContentComposer {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into().trim_end_matches('/').to_string(),
        }
    }

    /// 任务详情页链接
    pub fn detail_url(&self, task: &TaskSnapshot) -> String {
        format!(
            "{}/v1/projects/detail/{}/pipelines/custom/{}/{}?display_name={}",
            self.base_uri,
            task.project_name,
            task.workflow_name,
            task.task_id,
            urlencoding::encode(&task.workflow_display_name)
        )
    }

    /// 任务状态通知
    pub fn compose_task(
        &self,
        rule: &NotificationRule,
        task: &TaskSnapshot,
        now: i64,
    ) -> Result<ComposedMessage, NotifyError> {
        let format = FormatRule::for_webhook(rule.webhook_type);
        let color = StatusColor::from_status(task.status);
        let title = title_line(format, task, status_label(task.status), color, status_icon(task.status));
        let base_info = base_info_lines(format, task, now);
        let job_blocks = task
            .jobs()
            .map(|job| job_block(format, job))
            .collect::<Result<Vec<_>, _>>()?;
        let detail_url = self.detail_url(task);

        if format.uses_card {
            let mut card = LarkCard::new(color.card_template(), title.trim_end());
            for (idx, line) in base_info.iter().enumerate() {
                card.add_field(line.as_str(), idx == 0);
            }
            for block in &job_blocks {
                card.add_field(block.trim_start_matches('\n'), true);
            }
            card.add_action(msg::MORE_INFO, detail_url);
            return Ok(ComposedMessage::Card(card));
        }

        let mut content = title.clone();
        content.push_str(&base_info.concat());
        content.push_str(&job_blocks.concat());
        content.push_str(&mention_content(rule));
        content.push_str(&format!(
            "\n\n{}[{}]({})",
            format.divider,
            msg::MORE_INFO,
            detail_url
        ));
        Ok(ComposedMessage::Markdown { title, content })
    }

    /// 审批请求通知（不展示 Job 详情）
    pub fn compose_approval(
        &self,
        rule: &NotificationRule,
        task: &TaskSnapshot,
        now: i64,
    ) -> Result<ComposedMessage, NotifyError> {
        let format = FormatRule::for_webhook(rule.webhook_type);
        let color = StatusColor::Info;
        let title = title_line(format, task, msg::WAITING_APPROVE, color, msg::ICON_POSITIVE);
        let base_info = base_info_lines(format, task, now);
        let detail_url = self.detail_url(task);

        if format.uses_card {
            let mut card = LarkCard::new(color.card_template(), title.trim_end());
            for (idx, line) in base_info.iter().enumerate() {
                card.add_field(line.as_str(), idx == 0);
            }
            card.add_action(msg::MORE_INFO, detail_url);
            return Ok(ComposedMessage::Card(card));
        }

        let mut content = title.clone();
        content.push_str(&base_info.concat());
        content.push_str(&mention_content(rule));
        content.push_str(&format!("[{}]({})", msg::MORE_INFO, detail_url));
        Ok(ComposedMessage::Markdown { title, content })
    }
}

fn title_line(
    format: &FormatRule,
    task: &TaskSnapshot,
    phrase: &str,
    color: StatusColor,
    icon: &str,
) -> String {
    let text = format!(
        "{} {} #{} {}",
        msg::WORKFLOW,
        task.workflow_display_name,
        task.task_id,
        phrase
    );
    if format.colored_title {
        format!(
            "{}{}<font color=\"{}\">{}</font> \n",
            format.title_prefix,
            icon,
            color.markdown(),
            text
        )
    } else {
        format!("{}{}{} \n", format.title_prefix, icon, text)
    }
}

/// 执行用户、项目名称、开始时间、持续时间（顺序固定）
fn base_info_lines(format: &FormatRule, task: &TaskSnapshot, now: i64) -> Vec<String> {
    vec![
        format.info_line(msg::CREATOR, &task.task_creator),
        format.info_line(msg::PROJECT, &task.project_name),
        format.info_line(msg::START_TIME, &format_start_time(task.start_time)),
        format.info_line(msg::DURATION, &format_duration(now - task.start_time)),
    ]
}

fn job_block(format: &FormatRule, job: &JobTask) -> Result<String, NotifyError> {
    let mut block = format!(
        "\n\n{}{}**{}**: {}    **{}**: {} \n",
        format.divider,
        format.line_prefix,
        job_type_label(&job.job_type),
        job.name,
        msg::STATUS,
        status_label(job.status)
    );

    match JobSpec::decode(job)? {
        JobSpec::Build(spec) => {
            let repos = spec.repos(job)?;
            if let Some(repo) = primary_repo(&repos) {
                if let Some(short_commit) = repo.short_commit_id() {
                    let mut prs = repo.prs.clone();
                    prs.sort_unstable();
                    let pr_links: Vec<String> = prs
                        .iter()
                        .filter_map(|id| repo.pr_link(*id).map(|link| format!("[#{}]({})", id, link)))
                        .collect();
                    let pr_info = if pr_links.is_empty() {
                        String::new()
                    } else {
                        format!("{} ", pr_links.join(" "))
                    };
                    block.push_str(&format.info_line(
                        msg::REPO_INFO,
                        &format!(
                            "{} {}[{}]({})",
                            repo.branch_or_tag(),
                            pr_info,
                            short_commit,
                            repo.commit_link(short_commit)
                        ),
                    ));

                    let lines = repo.commit_lines();
                    if let [line] = lines.as_slice() {
                        block.push_str(&format.info_line(msg::COMMIT_MESSAGE, line));
                    } else {
                        block.push_str(&format!(
                            "{}**{}**：\n",
                            format.line_prefix,
                            msg::COMMIT_MESSAGE
                        ));
                        for line in &lines {
                            block.push_str(&format!("{} \n", line));
                        }
                    }
                }
            }
            if let Some(image) = spec.image().filter(|i| !i.is_empty()) {
                block.push_str(&format.info_line(msg::IMAGE, image));
            }
        }
        JobSpec::Deploy(spec) => {
            block.push_str(&format.info_line(msg::ENV, &spec.env));
        }
        JobSpec::Other => {}
    }

    Ok(block)
}
