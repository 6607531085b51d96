//! Connection registry の実装

use std::{collections::HashMap, sync::Arc};

use tokio::sync::Mutex;

use crate::domain::{RegisteredConnection, UserId};

pub mod inmemory;

pub use inmemory::InMemoryConnectionRegistry;

/// 接続テーブル
///
/// Registry と MessagePusher で共有される。
pub type ConnectionTable = Arc<Mutex<HashMap<UserId, RegisteredConnection>>>;

/// 空の接続テーブルを作成
pub fn new_connection_table() -> ConnectionTable {
    Arc::new(Mutex::new(HashMap::new()))
}
