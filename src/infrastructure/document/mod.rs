//! Document registry implementations

mod in_memory;
mod postgres;

pub use in_memory::InMemoryDocumentRepository;
pub use postgres::PostgresDocumentRepository;
