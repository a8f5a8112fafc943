//! 只读数据源 - 工作流定义、任务快照与时钟
//!
//! 通知核心只通过这里的 trait 读取外部数据，生产环境由上游系统实现，
//! 测试中使用手写 mock。`JsonFileStore` 是一个基于本地 JSON 目录的实现，供 CLI 使用。

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::NotifyError;
use crate::model::{TaskSnapshot, WorkflowDefinition};

/// 工作流定义查询
pub trait WorkflowStore: Send + Sync {
    fn find_workflow(&self, name: &str) -> Result<WorkflowDefinition, NotifyError>;
}

/// 任务快照查询，任务不存在（包括 task_id <= 0）时返回 `NotifyError::NotFound`
pub trait TaskStore: Send + Sync {
    fn find_task(&self, workflow_name: &str, task_id: i64) -> Result<TaskSnapshot, NotifyError>;
}

/// 时钟（可注入，便于测试）
pub trait Clock: Send + Sync {
    /// 当前 Unix 秒
    fn now_unix(&self) -> i64;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// 固定时钟
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_unix(&self) -> i64 {
        self.0
    }
}

/// 本地 JSON 目录数据源
///
/// 目录结构：
/// - `workflows/{name}.json` → `WorkflowDefinition`
/// - `tasks/{name}/{task_id}.json` → `TaskSnapshot`
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn workflow_path(&self, name: &str) -> PathBuf {
        self.root.join("workflows").join(format!("{}.json", name))
    }

    pub fn task_path(&self, workflow_name: &str, task_id: i64) -> PathBuf {
        self.root
            .join("tasks")
            .join(workflow_name)
            .join(format!("{}.json", task_id))
    }

    fn read_json<T: serde::de::DeserializeOwned>(
        path: &Path,
        kind: &'static str,
        key: String,
    ) -> Result<T, NotifyError> {
        if !path.exists() {
            return Err(NotifyError::not_found(kind, key));
        }
        let content = fs::read_to_string(path)
            .map_err(|e| NotifyError::Lookup(format!("read {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Loaded {} record", kind);
        serde_json::from_str(&content)
            .map_err(|e| NotifyError::Lookup(format!("parse {}: {}", path.display(), e)))
    }
}

impl WorkflowStore for JsonFileStore {
    fn find_workflow(&self, name: &str) -> Result<WorkflowDefinition, NotifyError> {
        Self::read_json(&self.workflow_path(name), "workflow", name.to_string())
    }
}

impl TaskStore for JsonFileStore {
    fn find_task(&self, workflow_name: &str, task_id: i64) -> Result<TaskSnapshot, NotifyError> {
        let key = format!("{}#{}", workflow_name, task_id);
        if task_id <= 0 {
            return Err(NotifyError::not_found("task", key));
        }
        Self::read_json(&self.task_path(workflow_name, task_id), "task", key)
    }
}
