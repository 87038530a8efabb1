//! VOID 进程入口共用的启动代码：日志、配置、依赖构建、关闭信号和 CLI 作业

pub mod bootstrap;
pub mod common;
pub mod jobs;
pub mod shutdown;
