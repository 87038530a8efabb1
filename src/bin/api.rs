use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use void::bootstrap::AppDependencies;
use void::common::{load_config_and_logging, wait_for_shutdown_signal};
use void::shutdown::ShutdownManager;
use void_api::{create_app, AppState};

#[derive(Parser, Debug)]
#[command(name = "void-api")]
#[command(about = "VOID - HTTP API 服务")]
struct Args {
    /// 配置文件路径（默认查找 config/void.toml、void.toml）
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Arc::new(load_config_and_logging(args.config.as_deref())?);

    let deps = AppDependencies::initialize(&config)
        .await
        .context("初始化依赖失败")?;

    if !config.is_development() && config.api.cors_origins.iter().any(|o| o == "*") {
        warn!(
            "CORS allows any origin in environment '{}'",
            config.app.environment
        );
    }

    let app = create_app(AppState {
        item_service: deps.item_service.clone(),
        config: config.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&config.api.bind_address)
        .await
        .with_context(|| format!("绑定地址失败: {}", config.api.bind_address))?;
    info!("API 服务监听于 {}", config.api.bind_address);

    let shutdown = ShutdownManager::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_shutdown_signal().await;
            shutdown.shutdown().await;
        });
    }

    let graceful = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { graceful.wait().await })
        .await
        .context("API 服务运行失败")?;

    deps.shutdown().await;
    info!("API 服务已退出");
    Ok(())
}
