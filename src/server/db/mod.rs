mod sqlite;

#[cfg(test)]
mod tests;

pub mod config;
pub mod factory;

use std::sync::Mutex;

use anyhow::{bail, Result};
use sqlite::{Sqlite, SqliteTransaction};

use crate::types::curd::CurdResponse;
use crate::types::page::PageQuery;

/// Database connection trait that can create transactions
pub trait Connection<'a, T>
where
    T: Transaction + 'a,
{
    /// Creates a new transaction from the connection
    fn transaction(&'a mut self) -> Result<T>;
}

/// Database transaction trait. Deleted records are invisible to every
/// operation.
pub trait Transaction {
    /// Inserts a record, filling `id`, `created_at` and `updated_at`.
    fn create_curd(&self, curd: CurdRecord) -> Result<CurdRecord>;
    fn is_curd_exists(&self, id: u64) -> Result<bool>;
    fn get_curd(&self, id: u64) -> Result<CurdRecord>;
    fn list_curds(&self, query: &PageQuery) -> Result<Vec<CurdRecord>>;
    fn count_curds(&self) -> Result<u64>;
    /// Replaces the data fields and touches `updated_at`.
    fn update_curd(&self, curd: &CurdRecord) -> Result<CurdRecord>;
    /// Soft delete: stamps `deleted_at`.
    fn delete_curd(&self, id: u64) -> Result<()>;

    /// Commits the transaction
    fn commit(self) -> Result<()>;
    /// Rolls back the transaction
    fn rollback(self) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurdRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub created_at: u64,
    pub updated_at: u64,
    pub deleted_at: Option<u64>,
}

impl From<CurdRecord> for CurdResponse {
    fn from(record: CurdRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            city: record.city,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

pub struct Database {
    conn: Mutex<UnionConnection>,
}

/// Enum representing different supported database connections
pub enum UnionConnection {
    /// SQLite database connection
    Sqlite(Sqlite),
}

enum UnionTransaction<'a> {
    Sqlite(SqliteTransaction<'a>),
}

impl Database {
    pub fn new(conn: UnionConnection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `f` in a transaction: committed when `f` succeeds, rolled back
    /// when it fails. A failing commit or rollback is returned as well.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&dyn Transaction) -> Result<T>,
    {
        let mut conn = match self.conn.lock() {
            Ok(conn) => conn,
            Err(e) => bail!("failed to lock database: {e:#}"),
        };
        let tx = conn.transaction()?;

        let result = f(&tx);

        if result.is_ok() {
            tx.commit()
        } else {
            tx.rollback()
        }?;

        result
    }
}

impl<'a> Connection<'a, UnionTransaction<'a>> for UnionConnection {
    fn transaction(&'a mut self) -> Result<UnionTransaction<'a>> {
        match self {
            UnionConnection::Sqlite(sqlite) => sqlite.transaction().map(UnionTransaction::Sqlite),
        }
    }
}

impl Transaction for UnionTransaction<'_> {
    fn create_curd(&self, curd: CurdRecord) -> Result<CurdRecord> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.create_curd(curd),
        }
    }

    fn is_curd_exists(&self, id: u64) -> Result<bool> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.is_curd_exists(id),
        }
    }

    fn get_curd(&self, id: u64) -> Result<CurdRecord> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.get_curd(id),
        }
    }

    fn list_curds(&self, query: &PageQuery) -> Result<Vec<CurdRecord>> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.list_curds(query),
        }
    }

    fn count_curds(&self) -> Result<u64> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.count_curds(),
        }
    }

    fn update_curd(&self, curd: &CurdRecord) -> Result<CurdRecord> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.update_curd(curd),
        }
    }

    fn delete_curd(&self, id: u64) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.delete_curd(id),
        }
    }

    fn commit(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.commit(),
        }
    }

    fn rollback(self) -> Result<()> {
        match self {
            UnionTransaction::Sqlite(tx) => tx.rollback(),
        }
    }
}
