pub mod database;
pub mod http_worker_client;

pub use database::memory::MemoryTaskRepository;
pub use database::postgres::PostgresTaskRepository;
pub use http_worker_client::HttpWorkerClient;
