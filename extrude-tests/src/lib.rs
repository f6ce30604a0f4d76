#![allow(non_snake_case)]

mod article;
mod memory;
mod multiple;
mod schema;

pub use memory::MemoryExecutor;

use crate::{
    article::{Article, article},
    multiple::multiple,
    schema::schema,
};
use extrude::{DatabaseConfig, Executor, Reflect, Session, TypeInfo};
use log::LevelFilter;
use std::env;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Configuration of the database the shared scenarios run against.
pub fn test_config() -> DatabaseConfig {
    DatabaseConfig::new("extrude-project", "extrude-instance", "extrude")
}

/// Record types the scenarios need tables for.
pub fn test_types() -> Vec<TypeInfo> {
    vec![Article::type_info(), multiple::Comment::type_info()]
}

pub async fn execute_tests<E: Executor>(mut session: Session<E>) {
    schema(&mut session).await;
    article(&mut session).await;
    multiple(&mut session).await;
}
