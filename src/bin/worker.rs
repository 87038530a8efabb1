use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use void::common::{load_config_and_logging, wait_for_shutdown_signal};
use void::shutdown::ShutdownManager;
use void_worker::{
    new_task_registry, register_all_tasks, ConsumerConfig, QueueConsumer, TaskDispatcher,
    WorkerDependencies,
};

#[derive(Parser, Debug)]
#[command(name = "void-worker")]
#[command(about = "VOID - 队列消费 Worker")]
struct Args {
    /// 配置文件路径（默认查找 config/void.toml、void.toml）
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config_and_logging(args.config.as_deref())?;

    let deps = WorkerDependencies::initialize(&config)
        .await
        .context("初始化 Worker 依赖失败")?;

    let mut registry = new_task_registry();
    register_all_tasks(&mut registry, &deps).context("注册任务失败")?;
    info!("已注册任务: {:?}", registry.list());

    let consumer = Arc::new(
        QueueConsumer::new(
            deps.queue(),
            TaskDispatcher::new(Arc::new(registry)),
            ConsumerConfig::from(&config.sqs),
        )
        .context("创建消费者失败")?,
    );

    let shutdown = ShutdownManager::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            shutdown.shutdown().await;
        });
    }
    {
        let consumer = consumer.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            shutdown.wait().await;
            consumer.stop().await;
        });
    }

    let result = consumer.start().await;
    deps.shutdown().await;

    match result {
        Ok(()) => {
            info!("Worker 已退出");
            Ok(())
        }
        Err(e) => {
            error!("Worker 异常退出: {}", e);
            Err(e).context("消费循环失败")
        }
    }
}
