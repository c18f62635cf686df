pub mod store;
pub use store::SharedStore;
pub mod memory_store;
pub use memory_store::MemoryStore;
pub mod file_store;
pub use file_store::FileStore;
pub mod pg_store;
pub use pg_store::PgStore;

pub mod collection;
pub mod legacy;

pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod message_repo;
pub use message_repo::MessageRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
