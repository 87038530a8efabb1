//! 从发送消息到 Item 落库的完整流程，使用进程内队列和内存工作单元

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::Instant;
use void_application::ItemService;
use void_domain::{ItemStatus, MessageQueue, TaskPayload};
use void_infrastructure::InMemoryMessageQueue;
use void_testing_utils::{
    InMemoryItemRepository, InMemoryItemStore, InMemoryUnitOfWorkFactory, TestEnv,
};
use void_worker::{
    new_task_registry, register_all_tasks, ConsumerConfig, QueueConsumer, TaskDispatcher,
    WorkerDependencies,
};

struct Harness {
    queue: Arc<InMemoryMessageQueue>,
    store: InMemoryItemStore,
    factory: InMemoryUnitOfWorkFactory,
    consumer: QueueConsumer,
}

fn harness(wait_time_seconds: u64) -> Harness {
    let store = InMemoryItemStore::new();
    let factory = InMemoryUnitOfWorkFactory::new(store.clone());
    let item_service = ItemService::new(
        Arc::new(factory.clone()),
        Arc::new(InMemoryItemRepository::new(store.clone())),
    );
    let queue = Arc::new(InMemoryMessageQueue::new());
    let deps = WorkerDependencies::new(item_service, queue.clone());

    let mut registry = new_task_registry();
    register_all_tasks(&mut registry, &deps).unwrap();

    let consumer = QueueConsumer::new(
        deps.queue(),
        TaskDispatcher::new(Arc::new(registry)),
        ConsumerConfig {
            wait_time_seconds,
            queue_url: String::new(),
        },
    )
    .unwrap();

    Harness {
        queue,
        store,
        factory,
        consumer,
    }
}

#[tokio::test]
async fn test_widget_message_creates_active_item() {
    TestEnv::init_logging();
    let h = harness(1);
    h.queue
        .send(
            r#"{"task_type":"process_item","data":{"name":"Widget"}}"#,
            "default",
            None,
        )
        .await
        .unwrap();
    assert_eq!(h.queue.get_queue_depth().await.unwrap(), 1);

    assert!(h.consumer.run_once().await.unwrap());

    let items = h.store.all();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Widget");
    assert_eq!(items[0].status, ItemStatus::Active);
    assert_eq!(items[0].metadata.as_ref().unwrap()["created_by"], "worker");

    assert_eq!(h.queue.get_queue_depth().await.unwrap(), 0);
    assert_eq!(h.queue.in_flight_count().await, 0);
    assert_eq!(h.factory.stats().committed(), 1);
    assert_eq!(h.factory.stats().closed(), 1);
}

#[tokio::test]
async fn test_failed_task_is_still_acknowledged() {
    let h = harness(1);
    let body = TaskPayload::new("process_item", json!({"name": "   "}))
        .to_body()
        .unwrap();
    h.queue.send(&body, "default", None).await.unwrap();

    assert!(h.consumer.run_once().await.unwrap());

    assert_eq!(h.store.count(), 0);
    assert_eq!(h.queue.get_queue_depth().await.unwrap(), 0);
    assert_eq!(h.queue.in_flight_count().await, 0);
}

#[tokio::test]
async fn test_unknown_task_is_acknowledged() {
    let h = harness(1);
    h.queue
        .send(r#"{"task_type":"send_email","data":{}}"#, "default", None)
        .await
        .unwrap();

    assert!(h.consumer.run_once().await.unwrap());
    assert_eq!(h.queue.in_flight_count().await, 0);
    assert_eq!(h.store.count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_empty_queue_waits_then_returns_nothing() {
    let h = harness(3);
    let started = Instant::now();

    assert!(!h.consumer.run_once().await.unwrap());
    assert!(started.elapsed() >= Duration::from_secs(3));
    assert_eq!(h.factory.stats().begun(), 0);
}

#[tokio::test]
async fn test_messages_in_one_group_processed_in_order() {
    let h = harness(0);
    for name in ["first", "second", "third"] {
        let body = TaskPayload::new("process_item", json!({ "name": name }))
            .to_body()
            .unwrap();
        h.queue.send(&body, "orders", None).await.unwrap();
    }

    while h.consumer.run_once().await.unwrap() {}

    let mut items = h.store.all();
    // 内存存储的 id 按写入顺序递增
    items.sort_by(|a, b| a.id.cmp(&b.id));
    let names: Vec<_> = items.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}
