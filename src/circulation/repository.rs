pub mod ddb_library_store;
pub mod memory_library_store;
