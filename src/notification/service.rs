//! 通知服务 - 对外入口
//!
//! 一次调用按顺序处理工作流定义中的全部通知规则：
//! 过滤 → 生成内容 → 分发。发送失败只记录日志并继续下一条规则；
//! 内容生成失败按 `RenderErrorPolicy` 处理（默认记录失败并继续）。

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::classifier::classify;
use super::composer::{ComposedMessage, ContentComposer};
use super::dispatcher::NotificationDispatcher;
use super::filter::{filter_approval_rule, filter_task_rule, FilterDecision};
use super::report::{NotifyReport, SendResult};
use crate::config::RenderErrorPolicy;
use crate::error::NotifyError;
use crate::model::{NotificationRule, TaskSnapshot};
use crate::store::{Clock, TaskStore, WorkflowStore};

/// 通知服务
pub struct NotificationService {
    workflows: Arc<dyn WorkflowStore>,
    tasks: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
    composer: ContentComposer,
    dispatcher: NotificationDispatcher,
    render_error_policy: RenderErrorPolicy,
}

impl NotificationService {
    pub fn new(
        workflows: Arc<dyn WorkflowStore>,
        tasks: Arc<dyn TaskStore>,
        clock: Arc<dyn Clock>,
        composer: ContentComposer,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            workflows,
            tasks,
            clock,
            composer,
            dispatcher,
            render_error_policy: RenderErrorPolicy::default(),
        }
    }

    pub fn with_render_error_policy(mut self, policy: RenderErrorPolicy) -> Self {
        self.render_error_policy = policy;
        self
    }

    pub fn composer(&self) -> &ContentComposer {
        &self.composer
    }

    /// 任务状态更新时调用
    pub fn notify_on_task_update(&self, task: &TaskSnapshot) -> Result<NotifyReport, NotifyError> {
        let mut report = NotifyReport::new(&task.workflow_name, task.task_id);
        if task.task_id <= 0 {
            debug!(workflow = %task.workflow_name, task_id = task.task_id, "Invalid task id, skipping notification");
            return Ok(report);
        }

        let workflow = self.workflows.find_workflow(&task.workflow_name).map_err(|e| {
            error!(workflow = %task.workflow_name, error = %e, "Failed to find workflow");
            e
        })?;
        if workflow.notify_ctls.is_empty() {
            return Ok(report);
        }

        let status_changed = classify(self.tasks.as_ref(), task);
        debug!(
            workflow = %task.workflow_name,
            task_id = task.task_id,
            status = %task.status,
            status_changed,
            "Evaluating notification rules"
        );

        let now = self.clock.now_unix();
        for (index, rule) in workflow.notify_ctls.iter().enumerate() {
            let decision = filter_task_rule(rule, task.status, status_changed);
            self.process_rule(&mut report, index, rule, decision, || {
                self.composer.compose_task(rule, task, now)
            })?;
        }

        info!(
            workflow = %task.workflow_name,
            task_id = task.task_id,
            sent = report.sent_count(),
            failed = report.failed_count(),
            "Task notification finished"
        );
        Ok(report)
    }

    /// 工作流进入等待审批时调用
    pub fn notify_on_approval_requested(
        &self,
        workflow_name: &str,
        task_id: i64,
    ) -> Result<NotifyReport, NotifyError> {
        let workflow = self.workflows.find_workflow(workflow_name).map_err(|e| {
            error!(workflow = %workflow_name, error = %e, "Failed to find workflow");
            e
        })?;
        let task = self.tasks.find_task(workflow_name, task_id).map_err(|e| {
            error!(workflow = %workflow_name, task_id, error = %e, "Failed to find workflow task");
            e
        })?;

        let mut report = NotifyReport::new(workflow_name, task_id);
        let now = self.clock.now_unix();
        for (index, rule) in workflow.notify_ctls.iter().enumerate() {
            let decision = filter_approval_rule(rule);
            self.process_rule(&mut report, index, rule, decision, || {
                self.composer.compose_approval(rule, &task, now)
            })?;
        }

        info!(
            workflow = %workflow_name,
            task_id,
            sent = report.sent_count(),
            failed = report.failed_count(),
            "Approval notification finished"
        );
        Ok(report)
    }

    fn process_rule<F>(
        &self,
        report: &mut NotifyReport,
        index: usize,
        rule: &NotificationRule,
        decision: FilterDecision,
        compose: F,
    ) -> Result<(), NotifyError>
    where
        F: FnOnce() -> Result<ComposedMessage, NotifyError>,
    {
        if let FilterDecision::Skip(reason) = decision {
            report.push(index, rule.webhook_type, SendResult::Skipped(reason.to_string()));
            return Ok(());
        }

        let message = match compose() {
            Ok(message) => message,
            Err(e) => {
                error!(rule = index, webhook_type = %rule.webhook_type, error = %e, "Failed to get notification content");
                match self.render_error_policy {
                    RenderErrorPolicy::Abort => return Err(e),
                    RenderErrorPolicy::Continue => {
                        report.push(index, rule.webhook_type, SendResult::Failed(e.to_string()));
                        return Ok(());
                    }
                }
            }
        };

        let result = match self.dispatcher.dispatch(rule, &message) {
            Ok(result) => result,
            Err(e) => {
                warn!(rule = index, webhook_type = %rule.webhook_type, error = %e, "Failed to send notification");
                SendResult::Failed(e.to_string())
            }
        };
        report.push(index, rule.webhook_type, result);
        Ok(())
    }
}
