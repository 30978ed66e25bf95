mod postgres_task_repository;

pub use postgres_task_repository::PostgresTaskRepository;
