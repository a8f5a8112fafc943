//! Job spec 解码
//!
//! `JobTask.spec` 的结构取决于 job_type，解码时做严格检查：
//! 结构不匹配直接返回 `NotifyError::Render`，不会静默填充零值。

use serde::{Deserialize, Serialize};

use super::task::{JobTask, JobType};
use crate::error::NotifyError;

const STEP_TYPE_GIT: &str = "git";
const IMAGE_ENV_KEY: &str = "IMAGE";

/// 按 job_type 解码后的 spec
#[derive(Debug, Clone)]
pub enum JobSpec {
    /// 构建 / 通用任务
    Build(BuildJobSpec),
    /// 部署 / helm 部署
    Deploy(DeployJobSpec),
    /// 其他类型不展示额外信息
    Other,
}

impl JobSpec {
    pub fn decode(job: &JobTask) -> Result<Self, NotifyError> {
        match job.job_type {
            JobType::Build | JobType::Freestyle => decode_value(job, &job.spec).map(JobSpec::Build),
            JobType::Deploy | JobType::HelmDeploy => {
                decode_value(job, &job.spec).map(JobSpec::Deploy)
            }
            _ => Ok(JobSpec::Other),
        }
    }
}

fn decode_value<T: serde::de::DeserializeOwned>(
    job: &JobTask,
    value: &serde_json::Value,
) -> Result<T, NotifyError> {
    T::deserialize(value).map_err(|e| NotifyError::Render {
        job: job.name.clone(),
        reason: format!("{} spec mismatch: {}", job.job_type, e),
    })
}

/// 构建类 Job spec
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildJobSpec {
    #[serde(default)]
    pub steps: Vec<StepTask>,
    #[serde(default)]
    pub properties: JobProperties,
}

impl BuildJobSpec {
    /// git 步骤中配置的代码库（多个 git 步骤时以最后一个为准）
    pub fn repos(&self, job: &JobTask) -> Result<Vec<Repository>, NotifyError> {
        let mut repos = Vec::new();
        for step in self.steps.iter().filter(|s| s.step_type == STEP_TYPE_GIT) {
            let spec: GitStepSpec = decode_value(job, &step.spec)?;
            repos = spec.repos;
        }
        Ok(repos)
    }

    /// IMAGE 环境变量
    pub fn image(&self) -> Option<&str> {
        self.properties
            .envs
            .iter()
            .rev()
            .find(|kv| kv.key == IMAGE_ENV_KEY)
            .map(|kv| kv.value.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTask {
    #[serde(default)]
    pub name: String,
    pub step_type: String,
    #[serde(default)]
    pub spec: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitStepSpec {
    pub repos: Vec<Repository>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobProperties {
    #[serde(default)]
    pub envs: Vec<KeyVal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyVal {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// 部署类 Job spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployJobSpec {
    pub env: String,
}

/// 代码托管平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GitProvider {
    Github,
    Gitlab,
    Gitee,
    Gerrit,
    #[serde(other)]
    Other,
}

/// 构建使用的代码库
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub source: GitProvider,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub repo_owner: String,
    #[serde(default)]
    pub repo_name: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub commit_id: String,
    #[serde(default)]
    pub commit_message: String,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub prs: Vec<i64>,
}

impl Repository {
    /// tag 优先于 branch
    pub fn branch_or_tag(&self) -> &str {
        if self.tag.is_empty() {
            &self.branch
        } else {
            &self.tag
        }
    }

    /// commit ID 前 8 位，不足 8 位时为 None
    pub fn short_commit_id(&self) -> Option<&str> {
        self.commit_id.get(..8)
    }

    /// PR / MR 链接，未知平台返回 None
    pub fn pr_link(&self, pr_id: i64) -> Option<String> {
        let (address, owner, name) = (&self.address, &self.repo_owner, &self.repo_name);
        match self.source {
            GitProvider::Github => Some(format!("{}/{}/{}/pull/{}", address, owner, name, pr_id)),
            GitProvider::Gitee => Some(format!("{}/{}/{}/pulls/{}", address, owner, name, pr_id)),
            GitProvider::Gitlab => Some(format!(
                "{}/{}/{}/merge_requests/{}",
                address, owner, name, pr_id
            )),
            GitProvider::Gerrit => Some(format!("{}/{}", address, pr_id)),
            GitProvider::Other => None,
        }
    }

    pub fn commit_link(&self, short_commit: &str) -> String {
        format!(
            "{}/{}/{}/commit/{}",
            self.address, self.repo_owner, self.repo_name, short_commit
        )
    }

    /// 去掉首尾换行后按行拆分的提交信息
    pub fn commit_lines(&self) -> Vec<&str> {
        self.commit_message.trim_matches('\n').split('\n').collect()
    }
}

/// 主代码库：优先 is_primary，否则取第一个
pub fn primary_repo(repos: &[Repository]) -> Option<&Repository> {
    repos.iter().find(|r| r.is_primary).or_else(|| repos.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::status::TaskStatus;
    use serde_json::json;

    fn repo(source: GitProvider, primary: bool) -> Repository {
        Repository {
            source,
            address: "https://git.example.com".to_string(),
            repo_owner: "team".to_string(),
            repo_name: "api".to_string(),
            branch: "main".to_string(),
            tag: String::new(),
            commit_id: "0123456789abcdef".to_string(),
            commit_message: "fix: typo".to_string(),
            is_primary: primary,
            prs: vec![],
        }
    }

    fn job(job_type: &str, spec: serde_json::Value) -> JobTask {
        JobTask {
            name: "job".to_string(),
            job_type: JobType::from(job_type.to_string()),
            status: TaskStatus::Passed,
            spec,
        }
    }

    #[test]
    fn test_primary_repo_defaults_to_first() {
        let repos = vec![repo(GitProvider::Github, false), repo(GitProvider::Gitlab, false)];
        assert_eq!(primary_repo(&repos).unwrap().source, GitProvider::Github);

        let repos = vec![repo(GitProvider::Github, false), repo(GitProvider::Gitlab, true)];
        assert_eq!(primary_repo(&repos).unwrap().source, GitProvider::Gitlab);

        assert!(primary_repo(&[]).is_none());
    }

    #[test]
    fn test_pr_link_shapes() {
        assert_eq!(
            repo(GitProvider::Github, false).pr_link(7).unwrap(),
            "https://git.example.com/team/api/pull/7"
        );
        assert_eq!(
            repo(GitProvider::Gitee, false).pr_link(7).unwrap(),
            "https://git.example.com/team/api/pulls/7"
        );
        assert_eq!(
            repo(GitProvider::Gitlab, false).pr_link(7).unwrap(),
            "https://git.example.com/team/api/merge_requests/7"
        );
        assert_eq!(
            repo(GitProvider::Gerrit, false).pr_link(7).unwrap(),
            "https://git.example.com/7"
        );
        assert!(repo(GitProvider::Other, false).pr_link(7).is_none());
    }

    #[test]
    fn test_short_commit_id_requires_eight_chars() {
        let mut r = repo(GitProvider::Github, false);
        assert_eq!(r.short_commit_id(), Some("01234567"));
        r.commit_id = "abcdefgh".to_string();
        assert_eq!(r.short_commit_id(), Some("abcdefgh"));
        r.commit_id = "abc".to_string();
        assert_eq!(r.short_commit_id(), None);
    }

    #[test]
    fn test_tag_wins_over_branch() {
        let mut r = repo(GitProvider::Github, false);
        assert_eq!(r.branch_or_tag(), "main");
        r.tag = "v1.2.0".to_string();
        assert_eq!(r.branch_or_tag(), "v1.2.0");
    }

    #[test]
    fn test_decode_build_spec() {
        let j = job(
            "zadig-build",
            json!({
                "steps": [
                    {"name": "tools", "step_type": "tools", "spec": {}},
                    {"name": "git", "step_type": "git", "spec": {"repos": [
                        {"source": "github", "repo_name": "api", "prs": [2]}
                    ]}}
                ],
                "properties": {"envs": [
                    {"key": "IMAGE", "value": "registry/api:1"},
                    {"key": "GOOS", "value": "linux"}
                ]}
            }),
        );
        let JobSpec::Build(spec) = JobSpec::decode(&j).unwrap() else {
            panic!("expected build spec");
        };
        let repos = spec.repos(&j).unwrap();
        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].prs, vec![2]);
        assert_eq!(spec.image(), Some("registry/api:1"));
    }

    #[test]
    fn test_decode_deploy_spec_mismatch_fails() {
        let j = job("zadig-deploy", json!({"env": 42}));
        let err = JobSpec::decode(&j).unwrap_err();
        assert!(err.is_render());

        let j = job("zadig-deploy", json!({"env": "staging"}));
        let JobSpec::Deploy(spec) = JobSpec::decode(&j).unwrap() else {
            panic!("expected deploy spec");
        };
        assert_eq!(spec.env, "staging");
    }

    #[test]
    fn test_decode_other_ignores_spec() {
        let j = job("zadig-test", json!("anything"));
        assert!(matches!(JobSpec::decode(&j).unwrap(), JobSpec::Other));
    }

    #[test]
    fn test_commit_lines_trims_newlines() {
        let mut r = repo(GitProvider::Github, false);
        r.commit_message = "\nfeat: a\n\nbody line\n".to_string();
        assert_eq!(r.commit_lines(), vec!["feat: a", "", "body line"]);
    }
}
