//! Repository 実装
//!
//! - `inmemory`: HashMap をインメモリ DB として使う実装
//! - 将来的に: `postgres` など

pub mod inmemory;

pub use inmemory::InMemoryRoomRepository;
