use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use void_errors::{VoidError, VoidResult};

/// 名称 → 处理器 的注册表
///
/// 启动时由单一入口显式填充，之后只读，通过 `Arc` 共享。
/// 任务（worker）和作业（CLI）共用这一实现。
pub struct Registry<H: ?Sized> {
    kind: &'static str,
    handlers: HashMap<String, Arc<H>>,
}

impl<H: ?Sized> Registry<H> {
    /// `kind` 只用于日志和错误信息，例如 "Task handler"、"Job"
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            handlers: HashMap::new(),
        }
    }

    /// 注册处理器；同名重复注册返回 `VoidError::Registration`，保留先注册的那个
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<H>) -> VoidResult<()> {
        let name = name.into();
        if self.handlers.contains_key(&name) {
            return Err(VoidError::registration_error(format!(
                "{} already registered: {}",
                self.kind, name
            )));
        }
        debug!("注册{}: {}", self.kind, name);
        self.handlers.insert(name, handler);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<H>> {
        self.handlers.get(name).cloned()
    }

    /// 已注册名称，按字母排序
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[cfg(test)]
    pub(crate) fn clear(&mut self) {
        self.handlers.clear();
    }
}
