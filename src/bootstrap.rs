use std::sync::Arc;

use tracing::{info, warn};
use void_application::ItemService;
use void_config::AppConfig;
use void_errors::VoidResult;
use void_infrastructure::{MongoClient, MongoItemRepository, MongoUnitOfWorkFactory};

/// API 与 CLI 共用的依赖容器
pub struct AppDependencies {
    pub item_service: ItemService,
    mongo: MongoClient,
}

impl AppDependencies {
    pub async fn initialize(config: &AppConfig) -> VoidResult<Self> {
        let mongo = MongoClient::connect(&config.database).await?;
        if let Err(e) = mongo.ping().await {
            warn!("MongoDB 暂不可达: {}", e);
        }

        let item_service = ItemService::new(
            Arc::new(MongoUnitOfWorkFactory::new(&mongo)),
            Arc::new(MongoItemRepository::new(mongo.database())),
        );

        info!("Dependencies initialized (database={})", config.database.name);
        Ok(Self {
            item_service,
            mongo,
        })
    }

    pub async fn shutdown(self) {
        self.mongo.shutdown().await;
    }
}
