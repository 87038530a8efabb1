pub mod client;
pub mod item_repository;
pub mod mapping;
pub mod unit_of_work;

pub use client::MongoClient;
pub use item_repository::{MongoItemRepository, ITEM_COLLECTION};
pub use unit_of_work::{MongoUnitOfWork, MongoUnitOfWorkFactory};
