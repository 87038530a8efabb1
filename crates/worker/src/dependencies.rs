use std::sync::Arc;

use tracing::{info, warn};
use void_application::ItemService;
use void_config::AppConfig;
use void_domain::MessageQueue;
use void_errors::VoidResult;
use void_infrastructure::{
    InMemoryMessageQueue, MongoClient, MongoItemRepository, MongoUnitOfWorkFactory,
    SqsMessageQueue,
};

/// Worker 进程的依赖容器
///
/// 启动时按 配置 → 客户端 → 服务 的顺序显式构建，之后以引用传给任务注册。
pub struct WorkerDependencies {
    item_service: ItemService,
    queue: Arc<dyn MessageQueue>,
    mongo: Option<MongoClient>,
}

impl WorkerDependencies {
    pub fn new(item_service: ItemService, queue: Arc<dyn MessageQueue>) -> Self {
        Self {
            item_service,
            queue,
            mongo: None,
        }
    }

    pub async fn initialize(config: &AppConfig) -> VoidResult<Self> {
        let mongo = MongoClient::connect(&config.database).await?;
        if let Err(e) = mongo.ping().await {
            warn!("MongoDB 暂不可达，将在首次使用时重试: {}", e);
        }

        let item_service = ItemService::new(
            Arc::new(MongoUnitOfWorkFactory::new(&mongo)),
            Arc::new(MongoItemRepository::new(mongo.database())),
        );

        let queue: Arc<dyn MessageQueue> = if config.sqs.queue_url.is_empty() {
            warn!("sqs.queue_url 未配置，使用进程内队列");
            Arc::new(InMemoryMessageQueue::new())
        } else {
            Arc::new(SqsMessageQueue::from_config(&config.aws, &config.sqs).await?)
        };

        info!("Worker dependencies initialized");
        Ok(Self {
            item_service,
            queue,
            mongo: Some(mongo),
        })
    }

    pub fn item_service(&self) -> &ItemService {
        &self.item_service
    }

    pub fn queue(&self) -> Arc<dyn MessageQueue> {
        self.queue.clone()
    }

    pub async fn shutdown(self) {
        if let Some(mongo) = self.mongo {
            mongo.shutdown().await;
        }
    }
}
