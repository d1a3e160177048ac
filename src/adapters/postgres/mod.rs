pub mod store;

// パブリックに型を再エクスポート
pub use store::LibraryStore as PostgresLibraryStore;
pub use store::PostgresUnitOfWork;
