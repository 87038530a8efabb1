//! 工作单元端口
//!
//! 一个工作单元持有一个事务会话以及绑定到该会话的仓储。
//! 必须显式 `commit`，否则退出时一律回滚；退出时总会结束会话。

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use tracing::{debug, error, warn};
use void_errors::{VoidError, VoidResult};

use crate::repositories::ItemRepository;

/// 事务会话状态：`Started → (Committed | Aborted) → Ended`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Started,
    Committed,
    Aborted,
    Ended,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionState::Started => "started",
            TransactionState::Committed => "committed",
            TransactionState::Aborted => "aborted",
            TransactionState::Ended => "ended",
        };
        f.write_str(s)
    }
}

impl TransactionState {
    /// 提交前的状态检查，供各实现共用
    pub fn ensure_committable(self) -> VoidResult<()> {
        match self {
            TransactionState::Started => Ok(()),
            TransactionState::Ended => Err(VoidError::transaction_error(
                "No active session to commit",
            )),
            TransactionState::Committed => Err(VoidError::transaction_error(
                "Transaction has already been committed",
            )),
            TransactionState::Aborted => Err(VoidError::transaction_error(
                "Cannot commit a transaction that has been aborted",
            )),
        }
    }
}

/// 事务范围内的工作单元
#[async_trait]
pub trait UnitOfWork: Send {
    /// 绑定到当前会话的 Item 仓储；会话结束后其操作返回 `VoidError::Transaction`
    fn items(&self) -> &dyn ItemRepository;

    fn state(&self) -> TransactionState;

    /// 提交事务。会话已结束时返回 "No active session to commit"，重复提交同样报错。
    async fn commit(&mut self) -> VoidResult<()>;

    /// 幂等回滚：无事务或已提交/已回滚/已结束时什么都不做
    async fn rollback(&mut self) -> VoidResult<()>;

    /// 退出作用域：未提交则回滚，随后总是结束会话。
    /// 回滚失败时仍会结束会话，并把回滚错误返回。
    async fn close(&mut self) -> VoidResult<()>;
}

/// 开启工作单元
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    /// 开启会话与事务；存储不支持事务时直接返回错误
    async fn begin(&self) -> VoidResult<Box<dyn UnitOfWork>>;
}

/// 在一个工作单元内执行 `work`，无论成功与否都会执行 `close`
///
/// `work` 内未调用 `commit` 时所有写入被丢弃；`work` 的错误原样返回。
pub async fn with_unit_of_work<T, F>(factory: &dyn UnitOfWorkFactory, work: F) -> VoidResult<T>
where
    T: Send,
    F: for<'u> FnOnce(&'u mut (dyn UnitOfWork + 'static)) -> BoxFuture<'u, VoidResult<T>> + Send,
{
    let mut uow = factory.begin().await?;
    let result = work(uow.as_mut()).await;

    match &result {
        Err(e) => warn!("工作单元内发生错误，回滚事务: {}", e),
        Ok(_) if uow.state() == TransactionState::Started => {
            debug!("工作单元未显式提交，回滚事务");
        }
        Ok(_) => {}
    }

    let closed = uow.close().await;
    match (result, closed) {
        (Err(e), Err(close_err)) => {
            error!("关闭工作单元失败: {}", close_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Ok(value), Ok(())) => Ok(value),
    }
}
