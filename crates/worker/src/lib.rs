pub mod consumer;
pub mod dependencies;
pub mod dispatcher;
pub mod task_registry;
pub mod tasks;

pub use consumer::{ConsumerConfig, ConsumerState, QueueConsumer, QueueStats};
pub use dependencies::WorkerDependencies;
pub use dispatcher::TaskDispatcher;
pub use task_registry::{new_task_registry, task_fn, FnTaskHandler, TaskHandler, TaskRegistry};
pub use tasks::register_all_tasks;
