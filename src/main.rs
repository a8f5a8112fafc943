//! Workflow Notifier CLI
//!
//! 读取本地 JSON 数据目录中的工作流定义和任务快照，发送或预览通知。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use workflow_notifier::notification::dispatcher::build_payloads;
use workflow_notifier::{
    Clock, ContentComposer, JsonFileStore, NotificationBuilder, NotifierConfig, NotifyReport,
    SendResult, SystemClock, TaskSnapshot, WorkflowStore,
};

#[derive(Parser)]
#[command(name = "wfn")]
#[command(about = "Workflow Notifier - 工作流任务通知")]
#[command(version)]
struct Cli {
    /// 数据目录（workflows/ 与 tasks/）
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// 系统访问地址，用于生成任务详情链接
    #[arg(long, global = true)]
    system_address: Option<String>,
    /// 只生成内容，不实际发送
    #[arg(long, global = true)]
    dry_run: bool,
    /// 输出 JSON 格式
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 任务状态更新后发送通知
    NotifyTask {
        /// 任务快照 JSON 文件
        #[arg(long)]
        task: PathBuf,
    },
    /// 发送审批请求通知
    NotifyApproval {
        /// 工作流名称
        #[arg(long)]
        workflow: String,
        /// 任务 ID
        #[arg(long)]
        task_id: i64,
    },
    /// 预览某条规则将要发送的请求体
    Preview {
        /// 任务快照 JSON 文件
        #[arg(long)]
        task: PathBuf,
        /// 规则下标
        #[arg(long, default_value = "0")]
        rule: usize,
        /// 预览审批请求通知
        #[arg(long)]
        approval: bool,
    },
}

fn main() -> Result<()> {
    // 通过 RUST_LOG 环境变量控制日志级别，默认为 info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("workflow_notifier=info,wfn=info"));

    fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let cli = Cli::parse();

    let mut config = NotifierConfig::auto_load()?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = Some(dir);
    }
    if let Some(addr) = cli.system_address.clone() {
        config.system_address = addr;
    }

    match cli.command {
        Commands::NotifyTask { task } => {
            let task = read_task(&task)?;
            let service = NotificationBuilder::new(config).dry_run(cli.dry_run).build()?;
            let report = service.notify_on_task_update(&task)?;
            print_report(&report, cli.json)?;
        }
        Commands::NotifyApproval { workflow, task_id } => {
            let service = NotificationBuilder::new(config).dry_run(cli.dry_run).build()?;
            let report = service.notify_on_approval_requested(&workflow, task_id)?;
            print_report(&report, cli.json)?;
        }
        Commands::Preview {
            task,
            rule,
            approval,
        } => {
            let task = read_task(&task)?;
            let store = JsonFileStore::new(config.resolved_data_dir());
            let workflow = store.find_workflow(&task.workflow_name)?;
            let rule = workflow.notify_ctls.get(rule).with_context(|| {
                format!(
                    "workflow {} has {} notification rules, index {} out of range",
                    workflow.name,
                    workflow.notify_ctls.len(),
                    rule
                )
            })?;

            let composer = ContentComposer::new(config.base_uri());
            let now = SystemClock.now_unix();
            let message = if approval {
                composer.compose_approval(rule, &task, now)?
            } else {
                composer.compose_task(rule, &task, now)?
            };
            info!(webhook_type = %rule.webhook_type, "Previewing notification");

            for payload in build_payloads(rule, &message)? {
                println!("{}", serde_json::to_string_pretty(&payload.to_json())?);
            }
        }
    }

    Ok(())
}

fn read_task(path: &Path) -> Result<TaskSnapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read task file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse task file {}", path.display()))
}

fn print_report(report: &NotifyReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "工作流 {} #{}：发送 {} / 跳过 {} / 失败 {}",
        report.workflow_name,
        report.task_id,
        report.sent_count(),
        report.skipped_count(),
        report.failed_count()
    );
    for outcome in &report.outcomes {
        let result = match &outcome.result {
            SendResult::Sent => "已发送".to_string(),
            SendResult::Skipped(reason) => format!("跳过 ({})", reason),
            SendResult::Failed(reason) => format!("失败 ({})", reason),
        };
        println!("  [{}] {} - {}", outcome.index, outcome.webhook_type, result);
    }
    Ok(())
}
