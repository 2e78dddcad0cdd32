pub mod format;
pub mod query_cache;
