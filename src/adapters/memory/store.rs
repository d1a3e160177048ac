use crate::domain::{
    Book, BookId, LoanHistory, LoanHistoryId, LoanStatus, NewBook, NewLoanHistory, NewUser, User,
    UserId,
};
use crate::ports::{
    BookRepository, CategoryCount, LibraryStore as LibraryStoreTrait, LoanHistoryRepository,
    UnitOfWork, UserRepository, unit_of_work::Result,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Whole-store snapshot
#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: BTreeMap<UserId, User>,
    books: BTreeMap<BookId, Book>,
    loan_histories: BTreeMap<LoanHistoryId, LoanHistory>,
    last_user_id: i64,
    last_book_id: i64,
    last_loan_history_id: i64,
}

/// In-memory implementation of LibraryStore
///
/// Every unit of work holds the store mutex from `begin` until it is
/// committed or dropped, so units of work are fully serialized. The first
/// write copies the shared state; the copy replaces it only on commit.
/// Read-only units of work never copy.
#[derive(Clone, Default)]
pub struct LibraryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl LibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn begin_unit(&self) -> InMemoryUnitOfWork {
        let guard = self.state.clone().lock_owned().await;
        InMemoryUnitOfWork {
            guard,
            working: None,
        }
    }
}

#[async_trait]
impl LibraryStoreTrait for LibraryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        Ok(Box::new(self.begin_unit().await))
    }
}

/// Unit of work over the in-memory store
pub struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: Option<MemoryState>,
}

impl InMemoryUnitOfWork {
    /// Current view: the private copy once written, the shared state before that
    fn state(&self) -> &MemoryState {
        match &self.working {
            Some(working) => working,
            None => &*self.guard,
        }
    }

    fn state_mut(&mut self) -> &mut MemoryState {
        let guard = &self.guard;
        self.working.get_or_insert_with(|| MemoryState::clone(guard))
    }
}

#[async_trait]
impl UserRepository for InMemoryUnitOfWork {
    async fn insert_user(&mut self, user: NewUser) -> Result<User> {
        let state = self.state_mut();
        state.last_user_id += 1;
        let user = User::from_new(UserId::from_i64(state.last_user_id), user);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&mut self, user_id: UserId) -> Result<Option<User>> {
        Ok(self.state().users.get(&user_id).cloned())
    }

    async fn find_user_by_name(&mut self, name: &str) -> Result<Option<User>> {
        Ok(self
            .state()
            .users
            .values()
            .find(|user| user.name == name)
            .cloned())
    }

    async fn find_user_by_name_shared(&mut self, name: &str) -> Result<Option<User>> {
        // the store mutex is already held for the whole unit of work
        self.find_user_by_name(name).await
    }

    async fn lock_user(&mut self, user_id: UserId) -> Result<bool> {
        Ok(self.state().users.contains_key(&user_id))
    }

    async fn find_all_users(&mut self) -> Result<Vec<User>> {
        Ok(self.state().users.values().cloned().collect())
    }

    async fn update_user(&mut self, user: &User) -> Result<()> {
        match self.state_mut().users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(format!("User {} does not exist", user.id.value()).into()),
        }
    }

    async fn delete_user(&mut self, user_id: UserId) -> Result<()> {
        let state = self.state_mut();
        state.users.remove(&user_id);
        state
            .loan_histories
            .retain(|_, history| history.user_id != user_id);
        Ok(())
    }

    async fn delete_all_users(&mut self) -> Result<()> {
        let state = self.state_mut();
        state.users.clear();
        state.loan_histories.clear();
        Ok(())
    }
}

#[async_trait]
impl BookRepository for InMemoryUnitOfWork {
    async fn insert_book(&mut self, book: NewBook) -> Result<Book> {
        let state = self.state_mut();
        state.last_book_id += 1;
        let book = Book::from_new(BookId::from_i64(state.last_book_id), book);
        state.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn find_book_by_name(&mut self, name: &str) -> Result<Option<Book>> {
        Ok(self
            .state()
            .books
            .values()
            .find(|book| book.name == name)
            .cloned())
    }

    async fn find_all_books(&mut self) -> Result<Vec<Book>> {
        Ok(self.state().books.values().cloned().collect())
    }

    async fn delete_all_books(&mut self) -> Result<()> {
        self.state_mut().books.clear();
        Ok(())
    }

    async fn count_books_by_category(&mut self) -> Result<Vec<CategoryCount>> {
        let mut counts = BTreeMap::new();
        for book in self.state().books.values() {
            *counts.entry(book.category).or_insert(0i64) += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(category, count)| CategoryCount { category, count })
            .collect())
    }
}

#[async_trait]
impl LoanHistoryRepository for InMemoryUnitOfWork {
    async fn insert_loan_history(&mut self, history: NewLoanHistory) -> Result<LoanHistory> {
        if !self.state().users.contains_key(&history.user_id) {
            return Err(format!("User {} does not exist", history.user_id.value()).into());
        }

        let state = self.state_mut();
        state.last_loan_history_id += 1;
        let history = LoanHistory::from_new(
            LoanHistoryId::from_i64(state.last_loan_history_id),
            history,
        );
        state.loan_histories.insert(history.id, history.clone());
        Ok(history)
    }

    async fn find_loan_history(
        &mut self,
        book_name: &str,
        status: LoanStatus,
    ) -> Result<Option<LoanHistory>> {
        Ok(self
            .state()
            .loan_histories
            .values()
            .find(|history| history.book_name == book_name && history.status == status)
            .cloned())
    }

    async fn find_loan_histories_by_user(&mut self, user_id: UserId) -> Result<Vec<LoanHistory>> {
        Ok(self
            .state()
            .loan_histories
            .values()
            .filter(|history| history.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_all_loan_histories(&mut self) -> Result<Vec<LoanHistory>> {
        Ok(self.state().loan_histories.values().cloned().collect())
    }

    async fn update_loan_history(&mut self, history: &LoanHistory) -> Result<()> {
        match self.state_mut().loan_histories.get_mut(&history.id) {
            Some(stored) => {
                stored.status = history.status;
                stored.returned_at = stored.returned_at.or(history.returned_at);
                Ok(())
            }
            None => Err(format!("Loan history {} does not exist", history.id.value()).into()),
        }
    }

    async fn count_loan_histories_by_status(&mut self, status: LoanStatus) -> Result<i64> {
        let count = self
            .state()
            .loan_histories
            .values()
            .filter(|history| history.status == status)
            .count();
        Ok(count as i64)
    }

    async fn lock_book_name(&mut self, _book_name: &str) -> Result<()> {
        // the store mutex is already held for the whole unit of work
        Ok(())
    }

    async fn delete_all_loan_histories(&mut self) -> Result<()> {
        self.state_mut().loan_histories.clear();
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork { mut guard, working } = *self;
        if let Some(working) = working {
            *guard = working;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}
