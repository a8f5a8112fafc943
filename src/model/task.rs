//! 工作流任务快照（只读，由上游执行引擎产生）

use serde::{Deserialize, Serialize};

use super::status::TaskStatus;

/// 一次工作流执行的快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// 工作流名称（唯一标识）
    pub workflow_name: String,
    /// 工作流显示名称
    pub workflow_display_name: String,
    /// 任务 ID，同一工作流内单调递增
    pub task_id: i64,
    /// 项目名称
    pub project_name: String,
    /// 执行用户
    pub task_creator: String,
    /// 开始时间（Unix 秒）
    pub start_time: i64,
    /// 当前状态
    pub status: TaskStatus,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

impl TaskSnapshot {
    /// 按 stage / job 原始顺序遍历所有 Job
    pub fn jobs(&self) -> impl Iterator<Item = &JobTask> {
        self.stages.iter().flat_map(|stage| stage.jobs.iter())
    }
}

/// 阶段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub jobs: Vec<JobTask>,
}

/// 单个 Job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobTask {
    pub name: String,
    pub job_type: JobType,
    #[serde(default)]
    pub status: TaskStatus,
    /// 按 job_type 解释的原始 spec，见 [`super::job_spec::JobSpec::decode`]
    #[serde(default)]
    pub spec: serde_json::Value,
}

/// Job 类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobType {
    Build,
    Freestyle,
    Deploy,
    HelmDeploy,
    CustomDeploy,
    Plugin,
    Testing,
    Scanning,
    DistributeImage,
    BlueGreenDeploy,
    BlueGreenRelease,
    CanaryDeploy,
    CanaryRelease,
    GrayRelease,
    GrayRollback,
    K8sPatch,
    IstioRelease,
    IstioRollback,
    Jira,
    Nacos,
    Apollo,
    MeegoTransition,
    /// 未识别的类型，原样保留
    Other(String),
}

impl JobType {
    pub fn as_str(&self) -> &str {
        match self {
            JobType::Build => "zadig-build",
            JobType::Freestyle => "freestyle",
            JobType::Deploy => "zadig-deploy",
            JobType::HelmDeploy => "zadig-helm-deploy",
            JobType::CustomDeploy => "custom-deploy",
            JobType::Plugin => "plugin",
            JobType::Testing => "zadig-test",
            JobType::Scanning => "zadig-scanning",
            JobType::DistributeImage => "zadig-distribute-image",
            JobType::BlueGreenDeploy => "k8s-blue-green-deploy",
            JobType::BlueGreenRelease => "k8s-blue-green-release",
            JobType::CanaryDeploy => "k8s-canary-deploy",
            JobType::CanaryRelease => "k8s-canary-release",
            JobType::GrayRelease => "k8s-gray-release",
            JobType::GrayRollback => "k8s-gray-rollback",
            JobType::K8sPatch => "k8s-resource-patch",
            JobType::IstioRelease => "istio-release",
            JobType::IstioRollback => "istio-rollback",
            JobType::Jira => "jira",
            JobType::Nacos => "nacos",
            JobType::Apollo => "apollo",
            JobType::MeegoTransition => "meego-transition",
            JobType::Other(raw) => raw,
        }
    }
}

impl From<String> for JobType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "zadig-build" => JobType::Build,
            "freestyle" => JobType::Freestyle,
            "zadig-deploy" => JobType::Deploy,
            "zadig-helm-deploy" => JobType::HelmDeploy,
            "custom-deploy" => JobType::CustomDeploy,
            "plugin" => JobType::Plugin,
            "zadig-test" => JobType::Testing,
            "zadig-scanning" => JobType::Scanning,
            "zadig-distribute-image" => JobType::DistributeImage,
            "k8s-blue-green-deploy" => JobType::BlueGreenDeploy,
            "k8s-blue-green-release" => JobType::BlueGreenRelease,
            "k8s-canary-deploy" => JobType::CanaryDeploy,
            "k8s-canary-release" => JobType::CanaryRelease,
            "k8s-gray-release" => JobType::GrayRelease,
            "k8s-gray-rollback" => JobType::GrayRollback,
            "k8s-resource-patch" => JobType::K8sPatch,
            "istio-release" => JobType::IstioRelease,
            "istio-rollback" => JobType::IstioRollback,
            "jira" => JobType::Jira,
            "nacos" => JobType::Nacos,
            "apollo" => JobType::Apollo,
            "meego-transition" => JobType::MeegoTransition,
            _ => JobType::Other(value),
        }
    }
}

impl From<JobType> for String {
    fn from(value: JobType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for JobType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_type_known_and_unknown() {
        let jt: JobType = serde_json::from_str("\"zadig-helm-deploy\"").unwrap();
        assert_eq!(jt, JobType::HelmDeploy);

        let jt: JobType = serde_json::from_str("\"sql-migration\"").unwrap();
        assert_eq!(jt, JobType::Other("sql-migration".to_string()));
        assert_eq!(serde_json::to_string(&jt).unwrap(), "\"sql-migration\"");
    }

    #[test]
    fn test_jobs_iterates_in_stage_order() {
        let json = serde_json::json!({
            "workflow_name": "wf",
            "workflow_display_name": "WF",
            "task_id": 1,
            "project_name": "demo",
            "task_creator": "alice",
            "start_time": 0,
            "status": "running",
            "stages": [
                {"name": "build", "jobs": [
                    {"name": "a", "job_type": "zadig-build"},
                    {"name": "b", "job_type": "plugin"}
                ]},
                {"name": "deploy", "jobs": [{"name": "c", "job_type": "zadig-deploy", "status": "passed"}]}
            ]
        });
        let task: TaskSnapshot = serde_json::from_value(json).unwrap();
        let names: Vec<&str> = task.jobs().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(task.stages[0].jobs[0].status, TaskStatus::NotRun);
    }
}
