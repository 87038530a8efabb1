//! 任务模块
//!
//! 每个模块提供一个 `register` 函数；新增模块时在 [`register_all_tasks`] 中加一行。

pub mod sample;

use void_errors::VoidResult;

use crate::dependencies::WorkerDependencies;
use crate::task_registry::TaskRegistry;

/// 启动时调用一次，注册所有任务
pub fn register_all_tasks(registry: &mut TaskRegistry, deps: &WorkerDependencies) -> VoidResult<()> {
    sample::register(registry, deps)?;
    Ok(())
}
