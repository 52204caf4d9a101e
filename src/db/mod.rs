pub mod redis;
pub mod sqlite;

pub use redis::Cache;
pub use redis::CacheKey;
pub use redis::CacheWriterHandle;
pub use sqlite::create_pool;
pub use sqlite::init_schema;
