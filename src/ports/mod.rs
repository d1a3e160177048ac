pub mod book_repository;
pub mod loan_history_repository;
pub mod unit_of_work;
pub mod user_repository;

pub use book_repository::{BookRepository, CategoryCount};
pub use loan_history_repository::LoanHistoryRepository;
pub use unit_of_work::{LibraryStore, UnitOfWork};
pub use user_repository::UserRepository;
