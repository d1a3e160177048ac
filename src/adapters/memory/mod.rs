pub mod store;

pub use store::InMemoryUnitOfWork;
pub use store::LibraryStore as InMemoryLibraryStore;
