//! In-memory implementations of the persistence and queue ports
//!
//! The item store mimics a transactional document store: a unit of work
//! stages its writes and only `commit` makes them visible. Ids are 24-char
//! hex strings so malformed-id handling matches the MongoDB adapter.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use void_domain::{
    ItemEntity, ItemRepository, MessageQueue, QueueMessage, TransactionState, UnitOfWork,
    UnitOfWorkFactory,
};
use void_errors::{VoidError, VoidResult};

/// 24 位十六进制，与 ObjectId 的字符串形式一致
pub fn is_well_formed_id(id: &str) -> bool {
    id.len() == 24 && id.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Default)]
struct StoreInner {
    items: HashMap<String, ItemEntity>,
    next_id: u64,
}

/// Shared committed state
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.items.clear();
        inner.next_id = 0;
    }

    pub fn get(&self, id: &str) -> Option<ItemEntity> {
        self.inner.lock().unwrap().items.get(id).cloned()
    }

    pub fn all(&self) -> Vec<ItemEntity> {
        self.inner.lock().unwrap().items.values().cloned().collect()
    }

    /// Insert directly, bypassing any unit of work
    pub fn insert(&self, entity: ItemEntity) -> String {
        let id = self.allocate_id();
        self.put(entity.with_id(id.clone()));
        id
    }

    fn allocate_id(&self) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        format!("{:024x}", inner.next_id)
    }

    fn put(&self, entity: ItemEntity) {
        if let Some(id) = entity.id.clone() {
            self.inner.lock().unwrap().items.insert(id, entity);
        }
    }
}

#[derive(Debug)]
struct SessionInner {
    state: TransactionState,
    staged: Vec<ItemEntity>,
}

/// Item repository bound to an optional in-memory session
#[derive(Debug, Clone)]
pub struct InMemoryItemRepository {
    store: InMemoryItemStore,
    session: Option<Arc<Mutex<SessionInner>>>,
}

impl InMemoryItemRepository {
    /// Repository without a session: writes are visible immediately
    pub fn new(store: InMemoryItemStore) -> Self {
        Self {
            store,
            session: None,
        }
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn create(&self, entity: &ItemEntity) -> VoidResult<String> {
        entity.validate()?;
        let id = self.store.allocate_id();
        let stored = entity.clone().with_id(id.clone());

        match &self.session {
            None => self.store.put(stored),
            Some(session) => {
                let mut session = session.lock().unwrap();
                match session.state {
                    TransactionState::Ended => {
                        return Err(VoidError::transaction_error(
                            "Repository used after its unit of work was closed",
                        ))
                    }
                    TransactionState::Started => session.staged.push(stored),
                    TransactionState::Committed | TransactionState::Aborted => {
                        self.store.put(stored)
                    }
                }
            }
        }

        Ok(id)
    }

    async fn get_by_id(&self, id: &str) -> VoidResult<Option<ItemEntity>> {
        if !is_well_formed_id(id) {
            return Ok(None);
        }

        if let Some(session) = &self.session {
            let session = session.lock().unwrap();
            if session.state == TransactionState::Ended {
                return Err(VoidError::transaction_error(
                    "Repository used after its unit of work was closed",
                ));
            }
            if let Some(staged) = session
                .staged
                .iter()
                .find(|e| e.id.as_deref() == Some(id))
            {
                return Ok(Some(staged.clone()));
            }
        }

        Ok(self.store.get(id))
    }
}

/// Lifecycle counters shared by a factory and the units of work it opens
#[derive(Debug, Default)]
pub struct UnitOfWorkStats {
    pub begun: AtomicUsize,
    pub committed: AtomicUsize,
    pub rolled_back: AtomicUsize,
    pub closed: AtomicUsize,
}

impl UnitOfWorkStats {
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }
    pub fn committed(&self) -> usize {
        self.committed.load(Ordering::SeqCst)
    }
    pub fn rolled_back(&self) -> usize {
        self.rolled_back.load(Ordering::SeqCst)
    }
    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Unit of work over [`InMemoryItemStore`]
pub struct InMemoryUnitOfWork {
    items: InMemoryItemRepository,
    session: Arc<Mutex<SessionInner>>,
    store: InMemoryItemStore,
    stats: Arc<UnitOfWorkStats>,
    fail_rollback: bool,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn items(&self) -> &dyn ItemRepository {
        &self.items
    }

    fn state(&self) -> TransactionState {
        self.session.lock().unwrap().state
    }

    async fn commit(&mut self) -> VoidResult<()> {
        let mut session = self.session.lock().unwrap();
        session.state.ensure_committable()?;
        for entity in session.staged.drain(..) {
            self.store.put(entity);
        }
        session.state = TransactionState::Committed;
        self.stats.committed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(&mut self) -> VoidResult<()> {
        let mut session = self.session.lock().unwrap();
        if session.state != TransactionState::Started {
            return Ok(());
        }
        session.staged.clear();
        session.state = TransactionState::Aborted;
        self.stats.rolled_back.fetch_add(1, Ordering::SeqCst);
        if self.fail_rollback {
            return Err(VoidError::database_error("simulated abortTransaction failure"));
        }
        Ok(())
    }

    async fn close(&mut self) -> VoidResult<()> {
        if self.state() == TransactionState::Ended {
            return Ok(());
        }
        let rolled_back = self.rollback().await;
        self.session.lock().unwrap().state = TransactionState::Ended;
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        rolled_back
    }
}

/// Factory for [`InMemoryUnitOfWork`]
#[derive(Clone, Default)]
pub struct InMemoryUnitOfWorkFactory {
    store: InMemoryItemStore,
    stats: Arc<UnitOfWorkStats>,
    fail_begin: Arc<AtomicBool>,
    fail_rollback: Arc<AtomicBool>,
}

impl InMemoryUnitOfWorkFactory {
    pub fn new(store: InMemoryItemStore) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn store(&self) -> &InMemoryItemStore {
        &self.store
    }

    pub fn stats(&self) -> Arc<UnitOfWorkStats> {
        self.stats.clone()
    }

    /// Make `begin` fail the way a standalone (non replica set) server does
    pub fn fail_begin(&self, fail: bool) {
        self.fail_begin.store(fail, Ordering::SeqCst);
    }

    pub fn fail_rollback(&self, fail: bool) {
        self.fail_rollback.store(fail, Ordering::SeqCst);
    }

    /// Open a concrete unit of work, for tests that need the type itself
    pub fn begin_in_memory(&self) -> VoidResult<InMemoryUnitOfWork> {
        if self.fail_begin.load(Ordering::SeqCst) {
            return Err(VoidError::database_error(
                "Transaction numbers are only allowed on a replica set member or mongos",
            ));
        }
        let session = Arc::new(Mutex::new(SessionInner {
            state: TransactionState::Started,
            staged: Vec::new(),
        }));
        self.stats.begun.fetch_add(1, Ordering::SeqCst);
        Ok(InMemoryUnitOfWork {
            items: InMemoryItemRepository {
                store: self.store.clone(),
                session: Some(session.clone()),
            },
            session,
            store: self.store.clone(),
            stats: self.stats.clone(),
            fail_rollback: self.fail_rollback.load(Ordering::SeqCst),
        })
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryUnitOfWorkFactory {
    async fn begin(&self) -> VoidResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(self.begin_in_memory()?))
    }
}

/// One scripted outcome of `receive`
#[derive(Debug, Clone)]
pub enum ScriptedReceive {
    Message(QueueMessage),
    Empty,
    Error(String),
}

/// A message passed to `send`
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub body: String,
    pub group_id: String,
    pub attributes: HashMap<String, String>,
}

/// `MessageQueue` that replays a fixed script of receive outcomes
///
/// Once the script runs out every `receive` returns `None`.
#[derive(Debug, Default)]
pub struct ScriptedQueue {
    script: Mutex<VecDeque<ScriptedReceive>>,
    deleted: Mutex<Vec<String>>,
    sent: Mutex<Vec<SentMessage>>,
    receive_calls: AtomicUsize,
    fail_delete: AtomicBool,
}

impl ScriptedQueue {
    pub fn new(script: Vec<ScriptedReceive>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn with_messages(messages: Vec<QueueMessage>) -> Self {
        Self::new(messages.into_iter().map(ScriptedReceive::Message).collect())
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl MessageQueue for ScriptedQueue {
    async fn receive(&self, _wait_seconds: u64) -> VoidResult<Option<QueueMessage>> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(ScriptedReceive::Message(message)) => Ok(Some(message)),
            Some(ScriptedReceive::Error(e)) => Err(VoidError::queue_error(e)),
            Some(ScriptedReceive::Empty) | None => {
                tokio::task::yield_now().await;
                Ok(None)
            }
        }
    }

    async fn delete(&self, receipt_handle: &str) -> VoidResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(VoidError::queue_error(format!(
                "ReceiptHandleIsInvalid: {receipt_handle}"
            )));
        }
        self.deleted.lock().unwrap().push(receipt_handle.to_string());
        Ok(())
    }

    async fn send(
        &self,
        body: &str,
        group_id: &str,
        attributes: Option<&HashMap<String, String>>,
    ) -> VoidResult<String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentMessage {
            body: body.to_string(),
            group_id: group_id.to_string(),
            attributes: attributes.cloned().unwrap_or_default(),
        });
        Ok(format!("sent-{}", sent.len()))
    }

    async fn get_queue_depth(&self) -> VoidResult<u64> {
        let script = self.script.lock().unwrap();
        Ok(script
            .iter()
            .filter(|r| matches!(r, ScriptedReceive::Message(_)))
            .count() as u64)
    }
}
