use crate::domain::{
    Book, BookCategory, BookId, LoanHistory, LoanHistoryId, LoanStatus, NewBook, NewLoanHistory,
    NewUser, User, UserId,
};
use crate::ports::{
    BookRepository, CategoryCount, LibraryStore as LibraryStoreTrait, LoanHistoryRepository,
    UnitOfWork, UserRepository, unit_of_work::Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::str::FromStr;

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// Convert an optional age to the INTEGER column type
fn age_to_db(age: Option<u16>) -> Option<i32> {
    age.map(i32::from)
}

fn map_row_to_user(row: &PgRow) -> Result<User> {
    let age: Option<i32> = row.get("age");
    let age = age
        .map(|age| u16::try_from(age).map_err(|_| invalid_data(format!("invalid age: {}", age))))
        .transpose()?;

    Ok(User {
        id: UserId::from_i64(row.get("id")),
        name: row.get("name"),
        age,
    })
}

fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let category_str: &str = row.get("category");
    let category = BookCategory::from_str(category_str).map_err(invalid_data)?;

    Ok(Book {
        id: BookId::from_i64(row.get("id")),
        name: row.get("name"),
        category,
    })
}

fn map_row_to_loan_history(row: &PgRow) -> Result<LoanHistory> {
    let status_str: &str = row.get("status");
    let status = LoanStatus::from_str(status_str).map_err(invalid_data)?;

    Ok(LoanHistory {
        id: LoanHistoryId::from_i64(row.get("id")),
        user_id: UserId::from_i64(row.get("user_id")),
        book_name: row.get("book_name"),
        status,
        loaned_at: row.get("loaned_at"),
        returned_at: row.get("returned_at"),
    })
}

/// PostgreSQL implementation of LibraryStore
///
/// Each unit of work is one database transaction.
pub struct LibraryStore {
    pool: PgPool,
}

impl LibraryStore {
    /// Create a new store over a PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LibraryStoreTrait for LibraryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresUnitOfWork { tx }))
    }
}

/// Unit of work backed by a PostgreSQL transaction
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UserRepository for PostgresUnitOfWork {
    async fn insert_user(&mut self, user: NewUser) -> Result<User> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (name, age)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(age_to_db(user.age))
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(User::from_new(UserId::from_i64(id), user))
    }

    async fn find_user_by_id(&mut self, user_id: UserId) -> Result<Option<User>> {
        let row = sqlx::query("SELECT id, name, age FROM users WHERE id = $1")
            .bind(user_id.value())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    async fn find_user_by_name(&mut self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, age
            FROM users
            WHERE name = $1
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    /// `FOR SHARE` blocks a concurrent `lock_user` until this unit of work ends.
    /// A user deleted while waiting is no longer returned.
    async fn find_user_by_name_shared(&mut self, name: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, age
            FROM users
            WHERE name = $1
            ORDER BY id ASC
            LIMIT 1
            FOR SHARE
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(map_row_to_user).transpose()
    }

    async fn lock_user(&mut self, user_id: UserId) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id.value())
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.is_some())
    }

    async fn find_all_users(&mut self) -> Result<Vec<User>> {
        let rows = sqlx::query("SELECT id, name, age FROM users ORDER BY id ASC")
            .fetch_all(&mut *self.tx)
            .await?;

        rows.iter().map(map_row_to_user).collect()
    }

    async fn update_user(&mut self, user: &User) -> Result<()> {
        let result = sqlx::query("UPDATE users SET name = $2, age = $3 WHERE id = $1")
            .bind(user.id.value())
            .bind(&user.name)
            .bind(age_to_db(user.age))
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(invalid_data(format!(
                "User {} does not exist",
                user.id.value()
            )));
        }
        Ok(())
    }

    /// Owned loan histories go with the user (ON DELETE CASCADE)
    async fn delete_user(&mut self, user_id: UserId) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id.value())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_all_users(&mut self) -> Result<()> {
        sqlx::query("DELETE FROM users")
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BookRepository for PostgresUnitOfWork {
    async fn insert_book(&mut self, book: NewBook) -> Result<Book> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO books (name, category)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(book.name())
        .bind(book.category().as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(Book::from_new(BookId::from_i64(id), book))
    }

    async fn find_book_by_name(&mut self, name: &str) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, category
            FROM books
            WHERE name = $1
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn find_all_books(&mut self) -> Result<Vec<Book>> {
        let rows = sqlx::query("SELECT id, name, category FROM books ORDER BY id ASC")
            .fetch_all(&mut *self.tx)
            .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn delete_all_books(&mut self) -> Result<()> {
        sqlx::query("DELETE FROM books")
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn count_books_by_category(&mut self) -> Result<Vec<CategoryCount>> {
        let rows = sqlx::query(
            r#"
            SELECT category, COUNT(id) AS count
            FROM books
            GROUP BY category
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter()
            .map(|row| -> Result<CategoryCount> {
                let category_str: &str = row.get("category");
                Ok(CategoryCount {
                    category: BookCategory::from_str(category_str).map_err(invalid_data)?,
                    count: row.get("count"),
                })
            })
            .collect()
    }
}

#[async_trait]
impl LoanHistoryRepository for PostgresUnitOfWork {
    async fn insert_loan_history(&mut self, history: NewLoanHistory) -> Result<LoanHistory> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO user_loan_histories (user_id, book_name, status, loaned_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(history.user_id.value())
        .bind(&history.book_name)
        .bind(history.status.as_str())
        .bind(history.loaned_at)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(LoanHistory::from_new(LoanHistoryId::from_i64(id), history))
    }

    async fn find_loan_history(
        &mut self,
        book_name: &str,
        status: LoanStatus,
    ) -> Result<Option<LoanHistory>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, book_name, status, loaned_at, returned_at
            FROM user_loan_histories
            WHERE book_name = $1 AND status = $2
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(book_name)
        .bind(status.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        row.as_ref().map(map_row_to_loan_history).transpose()
    }

    async fn find_loan_histories_by_user(&mut self, user_id: UserId) -> Result<Vec<LoanHistory>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, book_name, status, loaned_at, returned_at
            FROM user_loan_histories
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(map_row_to_loan_history).collect()
    }

    async fn find_all_loan_histories(&mut self) -> Result<Vec<LoanHistory>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, book_name, status, loaned_at, returned_at
            FROM user_loan_histories
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter().map(map_row_to_loan_history).collect()
    }

    async fn update_loan_history(&mut self, history: &LoanHistory) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE user_loan_histories
            SET status = $2, returned_at = COALESCE(returned_at, $3)
            WHERE id = $1
            "#,
        )
        .bind(history.id.value())
        .bind(history.status.as_str())
        .bind(history.returned_at)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(invalid_data(format!(
                "Loan history {} does not exist",
                history.id.value()
            )));
        }
        Ok(())
    }

    async fn count_loan_histories_by_status(&mut self, status: LoanStatus) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_loan_histories WHERE status = $1")
                .bind(status.as_str())
                .fetch_one(&mut *self.tx)
                .await?;

        Ok(count)
    }

    /// Transaction-scoped advisory lock keyed by the book name hash.
    /// Released automatically on commit or rollback.
    async fn lock_book_name(&mut self, book_name: &str) -> Result<()> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(book_name)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_all_loan_histories(&mut self) -> Result<()> {
        sqlx::query("DELETE FROM user_loan_histories")
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<()> {
        let PostgresUnitOfWork { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let PostgresUnitOfWork { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
