pub mod record;
pub mod store;

pub use record::MemoryRecord;
pub use store::MemoryStore;
