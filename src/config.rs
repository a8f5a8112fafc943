//! 通知配置
//!
//! 加载顺序（后者覆盖前者）：
//! 1. 默认值
//! 2. `~/.config/workflow-notifier/config.json`
//! 3. 环境变量 `WFN_SYSTEM_ADDRESS` / `WFN_TIMEOUT_SECS` / `WFN_DATA_DIR`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// 默认 webhook 请求超时（秒）
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_SYSTEM_ADDRESS: &str = "http://localhost:8080";

/// 内容生成失败时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderErrorPolicy {
    /// 立即返回错误，剩余规则不再处理
    Abort,
    /// 记录失败并继续处理剩余规则
    #[default]
    Continue,
}

/// 通知配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// 系统访问地址，用于拼接任务详情链接
    pub system_address: String,
    /// webhook 请求超时（秒）
    pub timeout_secs: u64,
    pub render_error_policy: RenderErrorPolicy,
    /// `JsonFileStore` 根目录
    pub data_dir: Option<PathBuf>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            system_address: DEFAULT_SYSTEM_ADDRESS.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            render_error_policy: RenderErrorPolicy::Continue,
            data_dir: None,
        }
    }
}

impl NotifierConfig {
    /// 默认配置文件路径
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/workflow-notifier/config.json"))
    }

    /// 从配置文件和环境变量自动加载
    pub fn auto_load() -> Result<Self> {
        let mut config = match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        debug!(path = %path.display(), "Loaded notifier config");
        Ok(config)
    }

    /// 环境变量覆盖，`lookup` 便于测试注入
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("WFN_SYSTEM_ADDRESS").filter(|v| !v.is_empty()) {
            self.system_address = addr;
        }
        if let Some(timeout) = lookup("WFN_TIMEOUT_SECS").filter(|v| !v.is_empty()) {
            self.timeout_secs = timeout
                .parse()
                .with_context(|| format!("WFN_TIMEOUT_SECS is not a number: {}", timeout))?;
        }
        if let Some(dir) = lookup("WFN_DATA_DIR").filter(|v| !v.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// 去掉末尾 `/` 的系统地址
    pub fn base_uri(&self) -> &str {
        self.system_address.trim_end_matches('/')
    }

    /// 数据目录，未配置时为 `~/.config/workflow-notifier/data`
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config/workflow-notifier/data")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = NotifierConfig::default();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.render_error_policy, RenderErrorPolicy::Continue);
    }

    #[test]
    fn test_apply_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("WFN_SYSTEM_ADDRESS", "https://ci.example.com/"),
            ("WFN_TIMEOUT_SECS", "3"),
        ]
        .into_iter()
        .collect();
        let mut config = NotifierConfig::default();
        config
            .apply_env(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_uri(), "https://ci.example.com");
        assert_eq!(config.timeout_secs, 3);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_apply_env_rejects_bad_timeout() {
        let mut config = NotifierConfig::default();
        let result = config.apply_env(|k| (k == "WFN_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_partial() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"render_error_policy": "abort"}"#).unwrap();

        let config = NotifierConfig::from_file(&path).unwrap();
        assert_eq!(config.render_error_policy, RenderErrorPolicy::Abort);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
