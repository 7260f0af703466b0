//! Connection lifecycle and transaction modes
//!
//! Every statement runs inside a scope acquired from the [`ConnectionManager`]:
//! open, run, commit when a transaction was begun, close. Query scopes never
//! begin a transaction. Mutation scopes wrap one statement. Batch scopes stay
//! open for any number of statements and commit once on release.

use std::cell::RefCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rusqlite::{Connection, OpenFlags};

use crate::value::Value;
use crate::{Error, Result};

static MEMORY_DATABASES: AtomicUsize = AtomicUsize::new(0);

/// Transaction policy of a connection scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnMode {
    /// One read-only statement, no transaction
    Query,
    /// One write statement, committed on release
    Mutation,
    /// Many statements through the same connection, committed once
    Batch,
}

impl ConnMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnMode::Query => "query",
            ConnMode::Mutation => "mutation",
            ConnMode::Batch => "batch",
        }
    }

    fn begins_transaction(&self) -> bool {
        !matches!(self, ConnMode::Query)
    }
}

impl fmt::Display for ConnMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the database lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbPath {
    File(PathBuf),
    Memory,
}

impl From<&Path> for DbPath {
    fn from(path: &Path) -> Self {
        DbPath::File(path.to_path_buf())
    }
}

impl From<PathBuf> for DbPath {
    fn from(path: PathBuf) -> Self {
        DbPath::File(path)
    }
}

impl fmt::Display for DbPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbPath::File(path) => write!(f, "{}", path.display()),
            DbPath::Memory => write!(f, ":memory:"),
        }
    }
}

#[derive(Debug)]
enum Target {
    File(PathBuf),
    SharedMemory(String),
}

impl Target {
    fn connect(&self) -> rusqlite::Result<Connection> {
        match self {
            Target::File(path) => Connection::open(path),
            Target::SharedMemory(uri) => {
                Connection::open_with_flags(uri, OpenFlags::default() | OpenFlags::SQLITE_OPEN_URI)
            }
        }
    }
}

struct Active {
    conn: Connection,
    mode: ConnMode,
}

/// Opens and closes connections around scopes.
///
/// At most one scope is live at a time. A statement submitted through
/// [`run`](Self::run) while a batch scope is live goes through the batch
/// connection; any other nested acquisition fails with [`Error::ScopeActive`].
pub struct ConnectionManager {
    path: DbPath,
    target: Target,
    // Keeps a shared-cache memory database alive between scopes.
    _anchor: Option<Connection>,
    active: RefCell<Option<Active>>,
}

impl ConnectionManager {
    pub fn open(path: DbPath) -> Result<Self> {
        let (target, anchor) = match &path {
            DbPath::File(file) => (Target::File(file.clone()), None),
            DbPath::Memory => {
                let n = MEMORY_DATABASES.fetch_add(1, Ordering::Relaxed);
                let uri = format!(
                    "file:mrdb-mem-{}-{}?mode=memory&cache=shared",
                    std::process::id(),
                    n
                );
                let target = Target::SharedMemory(uri);
                let anchor = target.connect()?;
                (target, Some(anchor))
            }
        };

        Ok(Self {
            path,
            target,
            _anchor: anchor,
            active: RefCell::new(None),
        })
    }

    pub fn path(&self) -> &DbPath {
        &self.path
    }

    pub fn is_active(&self) -> bool {
        self.active.borrow().is_some()
    }

    pub fn active_mode(&self) -> Option<ConnMode> {
        self.active.borrow().as_ref().map(|a| a.mode)
    }

    /// Open a connection for `mode`. The scope releases on drop; call
    /// [`ConnectionScope::release`] to observe commit and close errors.
    pub fn acquire(&self, mode: ConnMode) -> Result<ConnectionScope<'_>> {
        if let Some(current) = self.active_mode() {
            return Err(Error::ScopeActive(current));
        }

        let conn = self.target.connect()?;
        if mode.begins_transaction() {
            conn.execute_batch("BEGIN")?;
        }
        tracing::debug!(mode = %mode, db = %self.path, "Connection acquired");

        *self.active.borrow_mut() = Some(Active { conn, mode });
        Ok(ConnectionScope {
            manager: self,
            mode,
            released: false,
        })
    }

    /// Run one unit of work in its own scope, or on the live batch connection.
    pub fn run<T>(
        &self,
        mode: ConnMode,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        match self.active_mode() {
            Some(ConnMode::Batch) => {
                let guard = self.active.borrow();
                let active = guard.as_ref().ok_or(Error::NoActiveScope)?;
                return Ok(f(&active.conn)?);
            }
            Some(current) => return Err(Error::ScopeActive(current)),
            None => {}
        }

        let scope = self.acquire(mode)?;
        let outcome = scope.execute(f);
        settle(outcome, scope.release())
    }

    /// Execute one statement on the already open connection.
    ///
    /// Never opens or closes anything; fails with [`Error::NoActiveScope`]
    /// outside a scope.
    pub fn sub_transaction(&self, sql: &str, values: &[Value]) -> Result<usize> {
        let guard = self.active.borrow();
        let active = guard.as_ref().ok_or(Error::NoActiveScope)?;
        tracing::info!(sql = %sql, values = ?values, "Sub-transaction");
        Ok(active.conn.execute(sql, rusqlite::params_from_iter(values))?)
    }

    fn release(&self) -> Result<()> {
        let taken = self.active.borrow_mut().take();
        let Some(Active { conn, mode }) = taken else {
            return Ok(());
        };

        let committed = if conn.is_autocommit() {
            Ok(())
        } else {
            conn.execute_batch("COMMIT")
        };
        // Close runs whether or not the commit succeeded.
        let closed = conn.close().map_err(|(_, e)| e);
        tracing::debug!(mode = %mode, db = %self.path, "Connection released");

        closed?;
        committed?;
        Ok(())
    }
}

/// Combine the outcome of a scope's work with the outcome of its release.
/// A work error wins; a release error is then only logged.
pub(crate) fn settle<T>(outcome: Result<T>, released: Result<()>) -> Result<T> {
    match outcome {
        Ok(value) => released.map(|_| value),
        Err(e) => {
            if let Err(release_err) = released {
                tracing::error!(error = %release_err, "Release failed after an earlier error");
            }
            Err(e)
        }
    }
}

impl fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("path", &self.path)
            .field("active", &self.active_mode())
            .finish()
    }
}

/// A live connection scope. Releasing commits (when a transaction was begun)
/// and then closes.
pub struct ConnectionScope<'m> {
    manager: &'m ConnectionManager,
    mode: ConnMode,
    released: bool,
}

impl ConnectionScope<'_> {
    pub fn mode(&self) -> ConnMode {
        self.mode
    }

    pub fn execute<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> Result<T> {
        let guard = self.manager.active.borrow();
        let active = guard.as_ref().ok_or(Error::NoActiveScope)?;
        Ok(f(&active.conn)?)
    }

    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.manager.release()
    }
}

impl Drop for ConnectionScope<'_> {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = self.manager.release() {
                tracing::error!(mode = %self.mode, error = %e, "Failed to release connection");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(manager: &ConnectionManager) -> i64 {
        manager
            .run(ConnMode::Query, |conn| {
                conn.query_row("SELECT COUNT(*) FROM t", [], |row| row.get(0))
            })
            .unwrap()
    }

    fn with_table() -> ConnectionManager {
        let manager = ConnectionManager::open(DbPath::Memory).unwrap();
        manager
            .run(ConnMode::Mutation, |conn| conn.execute("CREATE TABLE t(id INTEGER)", []))
            .unwrap();
        manager
    }

    #[test]
    fn test_memory_database_survives_scopes() {
        let manager = with_table();
        manager
            .run(ConnMode::Mutation, |conn| conn.execute("INSERT INTO t VALUES (1)", []))
            .unwrap();
        assert_eq!(count(&manager), 1);
        assert!(!manager.is_active());
    }

    #[test]
    fn test_memory_databases_are_isolated() {
        let first = with_table();
        let second = ConnectionManager::open(DbPath::Memory).unwrap();
        first
            .run(ConnMode::Mutation, |conn| conn.execute("INSERT INTO t VALUES (1)", []))
            .unwrap();
        assert!(second
            .run(ConnMode::Query, |conn| conn.query_row("SELECT COUNT(*) FROM t", [], |r| r.get::<_, i64>(0)))
            .is_err());
    }

    #[test]
    fn test_reentrant_acquire_is_rejected() {
        let manager = with_table();
        let scope = manager.acquire(ConnMode::Mutation).unwrap();
        assert!(matches!(
            manager.acquire(ConnMode::Query),
            Err(Error::ScopeActive(ConnMode::Mutation))
        ));
        assert!(matches!(
            manager.run(ConnMode::Query, |_| Ok(())),
            Err(Error::ScopeActive(ConnMode::Mutation))
        ));
        scope.release().unwrap();
        assert!(manager.acquire(ConnMode::Query).is_ok());
    }

    #[test]
    fn test_batch_commits_once_on_release() {
        let manager = with_table();
        let scope = manager.acquire(ConnMode::Batch).unwrap();
        for i in 0..5 {
            manager
                .sub_transaction("INSERT INTO t VALUES (?)", &[Value::Integer(i)])
                .unwrap();
        }
        manager
            .run(ConnMode::Mutation, |conn| conn.execute("INSERT INTO t VALUES (5)", []))
            .unwrap();
        assert_eq!(manager.active_mode(), Some(ConnMode::Batch));
        scope.release().unwrap();
        assert_eq!(count(&manager), 6);
    }

    #[test]
    fn test_dropped_scope_is_released() {
        let manager = with_table();
        {
            let _scope = manager.acquire(ConnMode::Batch).unwrap();
            manager
                .sub_transaction("INSERT INTO t VALUES (?)", &[Value::Integer(1)])
                .unwrap();
        }
        assert!(!manager.is_active());
        assert_eq!(count(&manager), 1);
    }

    #[test]
    fn test_sub_transaction_requires_scope() {
        let manager = with_table();
        assert!(matches!(
            manager.sub_transaction("INSERT INTO t VALUES (1)", &[]),
            Err(Error::NoActiveScope)
        ));
    }

    #[test]
    fn test_statement_error_still_releases() {
        let manager = with_table();
        let result = manager.run(ConnMode::Mutation, |conn| conn.execute("INSERT INTO missing VALUES (1)", []));
        assert!(matches!(result, Err(Error::Storage(_))));
        assert!(!manager.is_active());
    }

    #[test]
    fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scopes.db");
        let manager = ConnectionManager::open(DbPath::from(path.as_path())).unwrap();
        manager
            .run(ConnMode::Mutation, |conn| conn.execute("CREATE TABLE t(id INTEGER)", []))
            .unwrap();
        drop(manager);

        let reopened = ConnectionManager::open(DbPath::File(path)).unwrap();
        assert_eq!(count(&reopened), 0);
    }
}
