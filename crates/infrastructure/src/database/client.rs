use std::time::Duration;

use bson::doc;
use mongodb::{options::ClientOptions, Client, Database};
use tracing::{error, info};
use void_config::DatabaseConfig;
use void_errors::{VoidError, VoidResult};

/// 进程内共享的 MongoDB 连接池
///
/// `mongodb::Client` 本身可安全并发使用，克隆开销很小。
#[derive(Clone, Debug)]
pub struct MongoClient {
    client: Client,
    database: Database,
}

impl MongoClient {
    pub async fn connect(config: &DatabaseConfig) -> VoidResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await.map_err(|e| {
            error!("解析 MongoDB 连接串失败: {}", e);
            VoidError::database_error(format!("解析 MongoDB 连接串失败: {e}"))
        })?;
        options.app_name = Some("void".to_string());
        options.max_pool_size = Some(config.max_pool_size);
        options.min_pool_size = Some(config.min_pool_size);
        options.max_idle_time = Some(Duration::from_millis(config.max_idle_time_ms));

        let client = Client::with_options(options)
            .map_err(|e| VoidError::database_error(format!("创建 MongoDB 客户端失败: {e}")))?;
        let database = client.database(&config.name);

        info!(
            "MongoDB 客户端已创建: database={}, pool={}..{}",
            config.name, config.min_pool_size, config.max_pool_size
        );

        Ok(Self { client, database })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub async fn ping(&self) -> VoidResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| VoidError::database_error(format!("MongoDB ping 失败: {e}")))?;
        Ok(())
    }

    pub async fn shutdown(self) {
        self.client.shutdown().await;
        info!("MongoDB 连接已关闭");
    }
}
