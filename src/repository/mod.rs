//! Repository layer: transaction-scoped data access.
//!
//! All storage work happens inside a [`UnitOfWork`], which owns exactly one
//! database transaction for its lifetime. Dropping the scope without calling
//! [`UnitOfWork::commit`] rolls the transaction back and returns the
//! connection to the pool — there is no path that leaks a connection or
//! silently keeps partial writes.

pub mod api_keys;
pub mod books;
pub mod library;
pub mod users;

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Transaction-scoped aggregate of the entity repositories.
///
/// One scope per logical request. The scope is not `Clone` and owns its
/// transaction by value, so opening "inside" an already-open scope is
/// unrepresentable; a service holds at most one at a time.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    /// Acquire a pooled connection and begin a transaction on it.
    pub async fn begin(pool: &Pool<Postgres>) -> AppResult<Self> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    /// Persist everything executed since `begin`, consuming the scope.
    pub async fn commit(self) -> AppResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    pub fn users(&mut self) -> users::UsersRepository<'_> {
        users::UsersRepository::new(&mut self.tx)
    }

    pub fn books(&mut self) -> books::BooksRepository<'_> {
        books::BooksRepository::new(&mut self.tx)
    }

    pub fn library(&mut self) -> library::LibraryRepository<'_> {
        library::LibraryRepository::new(&mut self.tx)
    }

    pub fn api_keys(&mut self) -> api_keys::ApiKeysRepository<'_> {
        api_keys::ApiKeysRepository::new(&mut self.tx)
    }
}
