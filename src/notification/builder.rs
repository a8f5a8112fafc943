//! 通知服务构建器 - 从配置组装各组件

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use super::composer::ContentComposer;
use super::dispatcher::NotificationDispatcher;
use super::service::NotificationService;
use super::transport::{HttpTransport, WebhookTransport};
use crate::config::NotifierConfig;
use crate::store::{Clock, JsonFileStore, SystemClock, TaskStore, WorkflowStore};

/// 通知服务构建器
///
/// 未指定时使用：`HttpTransport`（配置中的超时）、`SystemClock`、
/// 以及 `data_dir` 下的 `JsonFileStore`。
pub struct NotificationBuilder {
    config: NotifierConfig,
    dry_run: bool,
    transport: Option<Arc<dyn WebhookTransport>>,
    clock: Option<Arc<dyn Clock>>,
    workflows: Option<Arc<dyn WorkflowStore>>,
    tasks: Option<Arc<dyn TaskStore>>,
}

impl NotificationBuilder {
    pub fn new(config: NotifierConfig) -> Self {
        Self {
            config,
            dry_run: false,
            transport: None,
            clock: None,
            workflows: None,
            tasks: None,
        }
    }

    /// 设置 dry-run 模式
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn transport(mut self, transport: Arc<dyn WebhookTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// 同时设置工作流与任务数据源
    pub fn stores(mut self, workflows: Arc<dyn WorkflowStore>, tasks: Arc<dyn TaskStore>) -> Self {
        self.workflows = Some(workflows);
        self.tasks = Some(tasks);
        self
    }

    pub fn build(self) -> Result<NotificationService> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(Duration::from_secs(self.config.timeout_secs))?),
        };

        let (workflows, tasks) = match (self.workflows, self.tasks) {
            (Some(workflows), Some(tasks)) => (workflows, tasks),
            _ => {
                let dir = self.config.resolved_data_dir();
                info!(data_dir = %dir.display(), "Using JSON file store");
                let store = Arc::new(JsonFileStore::new(dir));
                (store.clone() as Arc<dyn WorkflowStore>, store as Arc<dyn TaskStore>)
            }
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let dispatcher = NotificationDispatcher::new(transport).with_dry_run(self.dry_run);
        let composer = ContentComposer::new(self.config.base_uri());

        Ok(NotificationService::new(workflows, tasks, clock, composer, dispatcher)
            .with_render_error_policy(self.config.render_error_policy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_build() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = NotifierConfig {
            data_dir: Some(dir.path().to_path_buf()),
            system_address: "https://ci.example.com/".to_string(),
            ..Default::default()
        };
        let service = NotificationBuilder::new(config).dry_run(true).build().unwrap();
        assert!(service
            .composer()
            .detail_url(&crate::model::TaskSnapshot {
                workflow_name: "wf".to_string(),
                workflow_display_name: "wf".to_string(),
                task_id: 1,
                project_name: "p".to_string(),
                task_creator: "u".to_string(),
                start_time: 0,
                status: crate::model::TaskStatus::Passed,
                stages: vec![],
            })
            .starts_with("https://ci.example.com/v1/projects/detail/p/"));
    }
}
