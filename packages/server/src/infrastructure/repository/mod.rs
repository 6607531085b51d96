//! Repository 実装
//!
//! - `inmemory`: ルームと図形をメモリ上に保持する実装

pub mod inmemory;

pub use inmemory::InMemoryWhiteboardStore;
