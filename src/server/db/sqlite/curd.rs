use anyhow::{bail, Result};
use rusqlite::{params, Connection, Row, Transaction};

use crate::server::db::CurdRecord;
use crate::time::current_timestamp;
use crate::types::page::PageQuery;

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS curd (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL DEFAULT '',
    phone TEXT NOT NULL DEFAULT '',
    city TEXT NOT NULL DEFAULT '',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    deleted_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_curd_deleted_at ON curd(deleted_at);
CREATE INDEX IF NOT EXISTS idx_curd_created_at ON curd(created_at);
"#;

const SELECT_COLUMNS: &str =
    "SELECT id, name, email, phone, city, created_at, updated_at, deleted_at FROM curd";

pub fn create_curd_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(CREATE_TABLES)?;
    Ok(())
}

fn convert_curd(row: &Row) -> rusqlite::Result<CurdRecord> {
    Ok(CurdRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        city: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
        deleted_at: row.get(7)?,
    })
}

pub fn create_curd(tx: &Transaction, mut curd: CurdRecord) -> Result<CurdRecord> {
    let now = current_timestamp();
    tx.execute(
        "INSERT INTO curd (name, email, phone, city, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        params![curd.name, curd.email, curd.phone, curd.city, now, now],
    )?;
    curd.id = tx.last_insert_rowid() as u64;
    curd.created_at = now;
    curd.updated_at = now;
    curd.deleted_at = None;
    Ok(curd)
}

pub fn is_curd_exists(tx: &Transaction, id: u64) -> Result<bool> {
    let mut stmt = tx.prepare("SELECT COUNT(*) FROM curd WHERE id = ? AND deleted_at IS NULL")?;
    let count: i64 = stmt.query_row(params![id], |row| row.get(0))?;
    Ok(count > 0)
}

pub fn get_curd(tx: &Transaction, id: u64) -> Result<CurdRecord> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ? AND deleted_at IS NULL");
    let mut stmt = tx.prepare(&sql)?;
    let curd = stmt.query_row(params![id], convert_curd)?;
    Ok(curd)
}

pub fn list_curds(tx: &Transaction, query: &PageQuery) -> Result<Vec<CurdRecord>> {
    // The sort order comes from a whitelist, the tie breaker keeps pages
    // stable when the sort column has duplicates.
    let sql = format!(
        "{SELECT_COLUMNS} WHERE deleted_at IS NULL ORDER BY {}, id ASC LIMIT ? OFFSET ?",
        query.sort
    );
    let mut stmt = tx.prepare(&sql)?;
    let rows = stmt.query_map(params![query.size, query.offset()], convert_curd)?;

    let mut curds = Vec::new();
    for row in rows {
        curds.push(row?);
    }
    Ok(curds)
}

pub fn count_curds(tx: &Transaction) -> Result<u64> {
    let mut stmt = tx.prepare("SELECT COUNT(*) FROM curd WHERE deleted_at IS NULL")?;
    let count: i64 = stmt.query_row([], |row| row.get(0))?;
    Ok(count as u64)
}

pub fn update_curd(tx: &Transaction, curd: &CurdRecord) -> Result<CurdRecord> {
    let now = current_timestamp();
    let updated = tx.execute(
        "UPDATE curd SET name = ?, email = ?, phone = ?, city = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        params![curd.name, curd.email, curd.phone, curd.city, now, curd.id],
    )?;
    if updated == 0 {
        bail!("curd {} not found", curd.id);
    }
    get_curd(tx, curd.id)
}

pub fn delete_curd(tx: &Transaction, id: u64) -> Result<()> {
    let now = current_timestamp();
    let deleted = tx.execute(
        "UPDATE curd SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
        params![now, id],
    )?;
    if deleted == 0 {
        bail!("curd {id} not found");
    }
    Ok(())
}
