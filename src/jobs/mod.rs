//! CLI 作业
//!
//! 与 worker 任务共用 [`Registry`]；每个作业模块提供 `register`，
//! 在 [`register_all_jobs`] 中逐一调用。

pub mod sample;

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::info;
use void_application::{ItemService, Registry};
use void_errors::{VoidError, VoidResult};

/// `--arg key=value` 解析后的参数
pub type JobArgs = HashMap<String, String>;

#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn run(&self, args: &JobArgs) -> VoidResult<()>;
}

pub type JobRegistry = Registry<dyn JobHandler>;

pub fn new_job_registry() -> JobRegistry {
    Registry::new("Job")
}

/// 作业可用的依赖
#[derive(Clone)]
pub struct JobContext {
    pub item_service: ItemService,
}

pub fn register_all_jobs(registry: &mut JobRegistry, ctx: &JobContext) -> VoidResult<()> {
    sample::register(registry, ctx)?;
    Ok(())
}

/// 解析 `key=value` 形式的参数；值中可以再包含 `=`
pub fn parse_job_args<S: AsRef<str>>(raw: &[S]) -> VoidResult<JobArgs> {
    raw.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            match arg.split_once('=') {
                Some((key, value)) if !key.trim().is_empty() => {
                    Ok((key.trim().to_string(), value.to_string()))
                }
                _ => Err(VoidError::validation_error(format!(
                    "Invalid argument '{arg}', expected key=value"
                ))),
            }
        })
        .collect()
}

/// 解析命令行参数后运行作业，参数错误与作业错误走同一返回路径
pub async fn run_job_with_args<S: AsRef<str>>(
    registry: &JobRegistry,
    name: &str,
    raw_args: &[S],
) -> VoidResult<()> {
    let args = parse_job_args(raw_args)?;
    run_job(registry, name, &args).await
}

/// 按名称运行作业；未知作业返回 `VoidError::Routing` 并列出已注册的作业
pub async fn run_job(registry: &JobRegistry, name: &str, args: &JobArgs) -> VoidResult<()> {
    let job = registry.get(name).ok_or_else(|| {
        VoidError::routing_error(format!(
            "Unknown job: {}. Available jobs: [{}]",
            name,
            registry.list().join(", ")
        ))
    })?;

    info!(job = name, "Running job");
    job.run(args).await?;
    info!(job = name, "Job finished");
    Ok(())
}

pub fn required_arg<'a>(args: &'a JobArgs, key: &str) -> VoidResult<&'a str> {
    args.get(key)
        .map(String::as_str)
        .ok_or_else(|| VoidError::validation_error(format!("Missing required argument '{key}'")))
}
