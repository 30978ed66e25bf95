pub mod repository;
pub mod worker_client;

pub use repository::TaskRepository;
pub use worker_client::WorkerClient;
