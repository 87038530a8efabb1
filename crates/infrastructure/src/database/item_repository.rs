use std::sync::Arc;

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::{ClientSession, Collection, Database};
use tokio::sync::Mutex;
use tracing::{debug, error, warn};
use void_domain::{ItemEntity, ItemRepository};
use void_errors::{VoidError, VoidResult};

use super::mapping::{item_from_document, item_to_document};

pub const ITEM_COLLECTION: &str = "Item";

/// 工作单元与其仓储共享的会话槽；会话结束后为 `None`
pub(crate) type SharedSession = Arc<Mutex<Option<ClientSession>>>;

/// MongoDB 上的 Item 仓储
pub struct MongoItemRepository {
    collection: Collection<Document>,
    session: Option<SharedSession>,
}

impl MongoItemRepository {
    /// 不绑定会话的仓储，用于只读查询
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(ITEM_COLLECTION),
            session: None,
        }
    }

    pub(crate) fn with_session(database: &Database, session: SharedSession) -> Self {
        Self {
            collection: database.collection(ITEM_COLLECTION),
            session: Some(session),
        }
    }

    fn projection() -> Document {
        doc! {
            "_id": 1,
            "name": 1,
            "description": 1,
            "status": 1,
            "created_at": 1,
            "updated_at": 1,
            "metadata": 1,
        }
    }
}

fn closed_session() -> VoidError {
    VoidError::transaction_error("Repository used after its unit of work was closed")
}

#[async_trait]
impl ItemRepository for MongoItemRepository {
    async fn create(&self, entity: &ItemEntity) -> VoidResult<String> {
        entity.validate()?;
        let document = item_to_document(entity)?;

        let result = match &self.session {
            None => self.collection.insert_one(document).await,
            Some(slot) => {
                let mut guard = slot.lock().await;
                let session = guard.as_mut().ok_or_else(closed_session)?;
                self.collection.insert_one(document).session(session).await
            }
        }
        .map_err(|e| {
            error!("插入 Item 失败: {}", e);
            VoidError::database_error(format!("插入 Item 失败: {e}"))
        })?;

        let id = match result.inserted_id {
            Bson::ObjectId(oid) => oid.to_hex(),
            other => other.to_string(),
        };
        debug!(item_id = %id, "Item inserted");
        Ok(id)
    }

    async fn get_by_id(&self, id: &str) -> VoidResult<Option<ItemEntity>> {
        let oid = match ObjectId::parse_str(id) {
            Ok(oid) => oid,
            Err(e) => {
                warn!("无效的 Item id {}: {}", id, e);
                return Ok(None);
            }
        };

        let filter = doc! { "_id": oid };
        let found = match &self.session {
            None => {
                self.collection
                    .find_one(filter)
                    .projection(Self::projection())
                    .await
            }
            Some(slot) => {
                let mut guard = slot.lock().await;
                let session = guard.as_mut().ok_or_else(closed_session)?;
                self.collection
                    .find_one(filter)
                    .projection(Self::projection())
                    .session(session)
                    .await
            }
        }
        .map_err(|e| {
            error!("查询 Item {} 失败: {}", id, e);
            VoidError::database_error(format!("查询 Item 失败: {e}"))
        })?;

        match found {
            None => Ok(None),
            Some(document) => item_from_document(&document).map(Some).map_err(|e| {
                error!("Item {} 文档不完整: {}", id, e);
                e
            }),
        }
    }
}
