mod errors;
mod loan_service;
mod unit_of_work;
mod user_service;

pub use errors::{ErrorKind, LibraryApplicationError, Result};
pub use loan_service::{
    ServiceDependencies, count_active_loans, get_book_statistics, loan_book, register_book,
    return_book,
};
pub use user_service::{
    UserLoanHistories, delete_user, get_user_loan_histories, list_users, register_user,
    rename_user,
};
