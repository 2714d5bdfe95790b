// src/db/transaction.rs
//
// Scoped transactions
//
// A rusqlite Transaction rolls back when dropped, so every early return
// (error, cancellation) leaves nothing behind. Commit happens in exactly
// one place, after the work succeeded and the caller is still waiting.

use rusqlite::{Connection, Transaction};
use tokio_util::sync::CancellationToken;

use super::connection::ensure_active;
use crate::error::AppResult;

/// What the work inside a transaction decided
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome<T> {
    Commit(T),
    /// Undo everything but still report `T` (e.g. zero rows affected)
    Rollback(T),
}

pub fn within_transaction<T, F>(
    conn: &mut Connection,
    cancel: &CancellationToken,
    work: F,
) -> AppResult<T>
where
    F: FnOnce(&Transaction<'_>, &CancellationToken) -> AppResult<TxOutcome<T>>,
{
    let tx = conn.transaction()?;

    match work(&tx, cancel)? {
        TxOutcome::Commit(value) => {
            ensure_active(cancel)?;
            tx.commit()?;
            Ok(value)
        }
        TxOutcome::Rollback(value) => {
            tx.rollback()?;
            Ok(value)
        }
    }
}
