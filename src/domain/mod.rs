pub mod book;
pub mod commands;
pub mod errors;
pub mod loan_history;
pub mod user;
pub mod value_objects;

pub use book::*;
pub use errors::*;
pub use loan_history::{LoanHistory, NewLoanHistory};
pub use user::*;
pub use value_objects::*;
