//! Workflow Notifier - 工作流任务通知（钉钉 / 飞书 / 企业微信）

pub mod config;
pub mod error;
pub mod model;
pub mod notification;
pub mod store;

pub use config::{NotifierConfig, RenderErrorPolicy};
pub use error::NotifyError;
pub use model::{
    JobTask, JobType, NotificationRule, Stage, TaskSnapshot, TaskStatus, WebhookType,
    WorkflowDefinition,
};
pub use notification::{
    ComposedMessage, ContentComposer, LarkCard, NotificationBuilder, NotificationDispatcher,
    NotificationService, NotifyReport, SendResult, WebhookEndpoint, WebhookPayload,
    WebhookTransport,
};
pub use store::{Clock, FixedClock, JsonFileStore, SystemClock, TaskStore, WorkflowStore};
