//! 通知用到的只读数据模型

pub mod job_spec;
pub mod rule;
pub mod status;
pub mod task;

pub use job_spec::{primary_repo, BuildJobSpec, DeployJobSpec, GitProvider, JobSpec, Repository};
pub use rule::{NotificationRule, WebhookType, WorkflowDefinition, AT_ALL};
pub use status::{TaskStatus, STATUS_CHANGED, STATUS_WAITING_APPROVE};
pub use task::{JobTask, JobType, Stage, TaskSnapshot};
