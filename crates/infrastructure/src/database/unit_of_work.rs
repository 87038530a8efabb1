use std::sync::Arc;

use async_trait::async_trait;
use mongodb::{Client, Database};
use tokio::sync::Mutex;
use tracing::{debug, error, info};
use void_domain::{ItemRepository, TransactionState, UnitOfWork, UnitOfWorkFactory};
use void_errors::{VoidError, VoidResult};

use super::client::MongoClient;
use super::item_repository::{MongoItemRepository, SharedSession};

/// MongoDB 多文档事务上的工作单元
///
/// 会话由工作单元独占，仓储通过共享槽访问同一会话。
/// `close` 之后会话被取出并丢弃，驱动在丢弃时结束会话；
/// 若作用域被取消而没有走到 `close`，驱动同样会在丢弃时中止未提交的事务。
pub struct MongoUnitOfWork {
    items: MongoItemRepository,
    session: SharedSession,
    state: TransactionState,
}

#[async_trait]
impl UnitOfWork for MongoUnitOfWork {
    fn items(&self) -> &dyn ItemRepository {
        &self.items
    }

    fn state(&self) -> TransactionState {
        self.state
    }

    async fn commit(&mut self) -> VoidResult<()> {
        self.state.ensure_committable()?;

        let mut guard = self.session.lock().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| VoidError::transaction_error("No active session to commit"))?;
        session.commit_transaction().await.map_err(|e| {
            error!("提交事务失败: {}", e);
            VoidError::transaction_error(format!("提交事务失败: {e}"))
        })?;

        self.state = TransactionState::Committed;
        info!("Transaction committed successfully");
        Ok(())
    }

    async fn rollback(&mut self) -> VoidResult<()> {
        if self.state != TransactionState::Started {
            return Ok(());
        }

        let mut guard = self.session.lock().await;
        let Some(session) = guard.as_mut() else {
            return Ok(());
        };
        // 中止失败时服务端仍会在超时后丢弃事务，状态按已中止处理
        self.state = TransactionState::Aborted;
        session.abort_transaction().await.map_err(|e| {
            error!("回滚事务失败: {}", e);
            VoidError::database_error(format!("回滚事务失败: {e}"))
        })?;

        debug!("Transaction rolled back");
        Ok(())
    }

    async fn close(&mut self) -> VoidResult<()> {
        if self.state == TransactionState::Ended {
            return Ok(());
        }

        let rolled_back = self.rollback().await;
        if let Err(e) = &rolled_back {
            error!("回滚失败，仍然结束会话: {}", e);
        }

        drop(self.session.lock().await.take());
        self.state = TransactionState::Ended;
        debug!("Session ended");
        rolled_back
    }
}

/// 从共享连接池开启 [`MongoUnitOfWork`]
#[derive(Clone)]
pub struct MongoUnitOfWorkFactory {
    client: Client,
    database: Database,
}

impl MongoUnitOfWorkFactory {
    pub fn new(mongo: &MongoClient) -> Self {
        Self {
            client: mongo.client().clone(),
            database: mongo.database().clone(),
        }
    }
}

#[async_trait]
impl UnitOfWorkFactory for MongoUnitOfWorkFactory {
    async fn begin(&self) -> VoidResult<Box<dyn UnitOfWork>> {
        let mut session = self.client.start_session().await.map_err(|e| {
            error!("开启会话失败: {}", e);
            VoidError::database_error(format!("开启会话失败: {e}"))
        })?;

        // 单节点（非副本集）部署在这里失败，直接向上传播
        session.start_transaction().await.map_err(|e| {
            error!("开启事务失败: {}", e);
            VoidError::database_error(format!("开启事务失败: {e}"))
        })?;

        let slot: SharedSession = Arc::new(Mutex::new(Some(session)));
        debug!("Transaction started");

        Ok(Box::new(MongoUnitOfWork {
            items: MongoItemRepository::with_session(&self.database, slot.clone()),
            session: slot,
            state: TransactionState::Started,
        }))
    }
}
