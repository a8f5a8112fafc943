//! 通知子系统 - 工作流任务状态通知的判定、生成与分发
//!
//! # 数据流
//! 任务快照 → 状态变化判定（`classifier`）→ 规则过滤（`filter`）
//! → 内容生成（`composer` / `card`）→ 分发（`dispatcher`）→ 发送（`transport`）
//!
//! # 使用示例
//! ```ignore
//! use workflow_notifier::{NotificationBuilder, NotifierConfig};
//!
//! let service = NotificationBuilder::new(NotifierConfig::auto_load()?).build()?;
//! let report = service.notify_on_task_update(&task)?;
//! ```

pub mod builder;
pub mod card;
pub mod classifier;
pub mod composer;
pub mod dispatcher;
pub mod filter;
pub mod format;
pub mod mention;
pub mod report;
pub mod service;
pub mod transport;

pub use builder::NotificationBuilder;
pub use card::LarkCard;
pub use classifier::is_status_changed;
pub use composer::{ComposedMessage, ContentComposer};
pub use dispatcher::NotificationDispatcher;
pub use filter::FilterDecision;
pub use format::{FormatRule, StatusColor};
pub use report::{NotifyReport, RuleOutcome, SendResult};
pub use service::NotificationService;
pub use transport::{HttpTransport, WebhookEndpoint, WebhookPayload, WebhookTransport};
