//! Background job dispatch: queue, worker pool, and job records

mod in_memory_repository;
mod queue;
mod worker;

pub use in_memory_repository::InMemoryJobRepository;
pub use queue::{JobReceiver, TokioJobQueue};
pub use worker::spawn_workers;
