//! MongoDB 工作单元集成测试
//!
//! 需要 Docker（或设置 `VOID_TEST_MONGODB_URI` 指向一个副本集），默认忽略：
//! `cargo test -p void-infrastructure -- --ignored`

use std::sync::Arc;

use serde_json::json;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::mongo::Mongo;
use tokio::time::{sleep, Duration};
use uuid::Uuid;
use void_config::DatabaseConfig;
use void_domain::{
    with_unit_of_work, ItemEntity, ItemRepository, ItemStatus, TransactionState,
    UnitOfWorkFactory, VoidError,
};
use void_infrastructure::{MongoClient, MongoItemRepository, MongoUnitOfWorkFactory};

struct TestMongo {
    _container: Option<ContainerAsync<Mongo>>,
    client: MongoClient,
}

/// 每个测试使用独立的数据库名，互不干扰
async fn setup_test_mongo() -> TestMongo {
    let (container, uri) = match std::env::var("VOID_TEST_MONGODB_URI") {
        Ok(uri) => (None, uri),
        Err(_) => {
            let container = Mongo::repl_set().start().await.unwrap();
            let port = container.get_host_port_ipv4(27017).await.unwrap();
            let uri = format!("mongodb://127.0.0.1:{port}/?directConnection=true");
            (Some(container), uri)
        }
    };

    let config = DatabaseConfig {
        uri,
        name: format!("void_test_{}", Uuid::new_v4().simple()),
        min_pool_size: 0,
        ..DatabaseConfig::default()
    };
    let client = MongoClient::connect(&config).await.unwrap();

    // 等待副本集选出主节点
    let mut retry_count = 0;
    loop {
        match client.ping().await {
            Ok(()) => break,
            Err(_) if retry_count < 30 => {
                retry_count += 1;
                sleep(Duration::from_millis(500)).await;
            }
            Err(e) => panic!("Failed to connect to test MongoDB: {e}"),
        }
    }

    TestMongo {
        _container: container,
        client,
    }
}

fn widget() -> ItemEntity {
    ItemEntity::create(
        "Widget",
        Some("A test widget".to_string()),
        Some(ItemStatus::Active),
        json!({"color": "blue", "tags": ["a", "b"]}).as_object().cloned(),
    )
    .unwrap()
}

#[tokio::test]
#[ignore]
async fn test_committed_item_round_trip() {
    let mongo = setup_test_mongo().await;
    let factory = MongoUnitOfWorkFactory::new(&mongo.client);
    let reader = MongoItemRepository::new(mongo.client.database());
    let entity = widget();

    let id = with_unit_of_work(&factory, |uow| {
        Box::pin(async move {
            let id = uow.items().create(&entity).await?;
            // 事务内可以读到自己的写入
            assert!(uow.items().get_by_id(&id).await?.is_some());
            uow.commit().await?;
            Ok(id)
        })
    })
    .await
    .unwrap();

    assert_eq!(id.len(), 24);
    let stored = reader.get_by_id(&id).await.unwrap().unwrap();
    assert_eq!(stored.id.as_deref(), Some(id.as_str()));
    assert_eq!(stored.name, "Widget");
    assert_eq!(stored.description, "A test widget");
    assert_eq!(stored.status, ItemStatus::Active);
    assert_eq!(
        stored.metadata.unwrap(),
        json!({"color": "blue", "tags": ["a", "b"]}).as_object().cloned().unwrap()
    );
}

#[tokio::test]
#[ignore]
async fn test_uncommitted_write_is_discarded() {
    let mongo = setup_test_mongo().await;
    let factory = MongoUnitOfWorkFactory::new(&mongo.client);
    let reader = MongoItemRepository::new(mongo.client.database());
    let entity = widget();

    let id = with_unit_of_work(&factory, |uow| {
        Box::pin(async move { uow.items().create(&entity).await })
    })
    .await
    .unwrap();

    assert!(reader.get_by_id(&id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_error_inside_scope_rolls_back() {
    let mongo = setup_test_mongo().await;
    let factory = MongoUnitOfWorkFactory::new(&mongo.client);
    let reader = MongoItemRepository::new(mongo.client.database());
    let entity = widget();
    let created = Arc::new(tokio::sync::Mutex::new(None));
    let created_in_scope = created.clone();

    let result: Result<(), VoidError> = with_unit_of_work(&factory, |uow| {
        Box::pin(async move {
            let id = uow.items().create(&entity).await?;
            *created_in_scope.lock().await = Some(id);
            Err(VoidError::validation_error("boom"))
        })
    })
    .await;

    assert!(matches!(result, Err(VoidError::Validation(_))));
    let id = created.lock().await.clone().unwrap();
    assert!(reader.get_by_id(&id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_commit_twice_and_after_close() {
    let mongo = setup_test_mongo().await;
    let factory = MongoUnitOfWorkFactory::new(&mongo.client);

    let mut uow = factory.begin().await.unwrap();
    uow.items().create(&widget()).await.unwrap();
    uow.commit().await.unwrap();
    assert_eq!(uow.state(), TransactionState::Committed);
    assert!(matches!(uow.commit().await, Err(VoidError::Transaction(_))));

    uow.close().await.unwrap();
    assert_eq!(uow.state(), TransactionState::Ended);
    let err = uow.commit().await.unwrap_err();
    assert_eq!(err.to_string(), "事务错误: No active session to commit");
    assert!(matches!(
        uow.items().create(&widget()).await,
        Err(VoidError::Transaction(_))
    ));
}

#[tokio::test]
#[ignore]
async fn test_malformed_and_missing_ids() {
    let mongo = setup_test_mongo().await;
    let reader = MongoItemRepository::new(mongo.client.database());

    assert!(reader.get_by_id("not-an-object-id").await.unwrap().is_none());
    assert!(reader
        .get_by_id("5f1d7f8e9a1b2c3d4e5f6a7b")
        .await
        .unwrap()
        .is_none());
}
