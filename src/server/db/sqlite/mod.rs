mod curd;

pub mod config;
pub mod factory;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use rusqlite::Connection as RawConnection;
use rusqlite::Transaction as RawTransaction;

use crate::types::page::PageQuery;

use super::{Connection, CurdRecord, Transaction};

/// SQLite backed database, file or in-memory.
pub struct Sqlite {
    conn: RawConnection,
}

pub struct SqliteTransaction<'a> {
    tx: RawTransaction<'a>,
}

impl Sqlite {
    /// Opens a SQLite database file, creating it if needed, and migrates the
    /// schema.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let conn = RawConnection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    /// Creates a new in-memory database. The content is lost when the
    /// process exits.
    pub fn memory() -> Result<Self> {
        let conn = RawConnection::open_in_memory()?;
        Self::init_tables(&conn)?;
        Ok(Self { conn })
    }

    fn init_tables(db: &RawConnection) -> Result<()> {
        curd::create_curd_tables(db)?;
        Ok(())
    }
}

impl<'a> Connection<'a, SqliteTransaction<'a>> for Sqlite {
    fn transaction(&'a mut self) -> Result<SqliteTransaction<'a>> {
        let tx = self.conn.transaction()?;
        Ok(SqliteTransaction { tx })
    }
}

impl Transaction for SqliteTransaction<'_> {
    fn create_curd(&self, curd: CurdRecord) -> Result<CurdRecord> {
        curd::create_curd(&self.tx, curd)
    }

    fn is_curd_exists(&self, id: u64) -> Result<bool> {
        curd::is_curd_exists(&self.tx, id)
    }

    fn get_curd(&self, id: u64) -> Result<CurdRecord> {
        curd::get_curd(&self.tx, id)
    }

    fn list_curds(&self, query: &PageQuery) -> Result<Vec<CurdRecord>> {
        curd::list_curds(&self.tx, query)
    }

    fn count_curds(&self) -> Result<u64> {
        curd::count_curds(&self.tx)
    }

    fn update_curd(&self, curd: &CurdRecord) -> Result<CurdRecord> {
        curd::update_curd(&self.tx, curd)
    }

    fn delete_curd(&self, id: u64) -> Result<()> {
        curd::delete_curd(&self.tx, id)
    }

    fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::server::db::{Database, UnionConnection};

    use super::*;

    #[test]
    fn test_sqlite() {
        let sqlite = Sqlite::memory().unwrap();
        let db = Database::new(UnionConnection::Sqlite(sqlite));
        crate::server::db::tests::run_all_tests(&db);
    }
}
