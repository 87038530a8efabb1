pub mod database;
pub mod http_client;
pub mod in_memory_queue;
pub mod message_queue;

pub use database::*;
pub use http_client::{HttpClient, HttpClientConfig, RequestOptions};
pub use in_memory_queue::{InMemoryMessageQueue, InMemoryQueueConfig};
pub use message_queue::SqsMessageQueue;
