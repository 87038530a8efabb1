use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use void::bootstrap::AppDependencies;
use void::common::load_config_and_logging;
use void::jobs::{new_job_registry, register_all_jobs, run_job_with_args, JobContext};

/// CLI应用程序主结构
#[derive(Parser, Debug)]
#[command(name = "void")]
#[command(about = "VOID - 命令行工具")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 配置文件路径（默认查找 config/void.toml、void.toml）
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 作业管理
    Job(JobCommands),
}

#[derive(Args, Debug)]
struct JobCommands {
    #[command(subcommand)]
    action: JobActions,
}

#[derive(Subcommand, Debug)]
enum JobActions {
    /// 运行作业
    Run {
        /// 作业名称
        name: String,
        /// 作业参数，可重复：--arg key=value
        #[arg(long = "arg", value_name = "KEY=VALUE")]
        args: Vec<String>,
    },
    /// 列出已注册的作业
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config_and_logging(cli.config.as_deref())?;

    let deps = AppDependencies::initialize(&config)
        .await
        .context("初始化依赖失败")?;
    let ctx = JobContext {
        item_service: deps.item_service.clone(),
    };
    // 依赖建立之后的任何错误都先关闭依赖再返回
    let result: Result<()> = async {
        let mut registry = new_job_registry();
        register_all_jobs(&mut registry, &ctx).context("注册作业失败")?;

        match cli.command {
            Commands::Job(JobCommands { action }) => match action {
                JobActions::Run { name, args } => run_job_with_args(&registry, &name, &args)
                    .await
                    .with_context(|| format!("作业 {name} 执行失败")),
                JobActions::List => {
                    let names = registry.list();
                    if names.is_empty() {
                        println!("No jobs registered.");
                    } else {
                        println!("Available jobs:");
                        for name in names {
                            println!("  - {name}");
                        }
                    }
                    Ok(())
                }
            },
        }
    }
    .await;

    deps.shutdown().await;
    result
}
