use parking_lot::Mutex;
use rusqlite::Connection;
use sayo_foundation::AppError;

/// Best-effort conversation persistence. A failed insert is the caller's
/// problem to log, never to propagate into the loop.
pub struct ConversationLog {
    conn: Mutex<Connection>,
}

impl ConversationLog {
    pub fn open(db_path: &str) -> Result<Self, AppError> {
        let conn = Connection::open(db_path).map_err(|e| AppError::Storage(e.to_string()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, AppError> {
        let conn = Connection::open_in_memory().map_err(|e| AppError::Storage(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, AppError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS conversation_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                user_text TEXT,
                reply_text TEXT
            )",
            [],
        )
        .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn record(&self, user_text: &str, reply_text: &str) -> Result<(), AppError> {
        self.conn
            .lock()
            .execute(
                "INSERT INTO conversation_logs (user_text, reply_text) VALUES (?1, ?2)",
                [user_text, reply_text],
            )
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(())
    }

    #[cfg(test)]
    fn count(&self) -> i64 {
        self.conn
            .lock()
            .query_row("SELECT COUNT(*) FROM conversation_logs", [], |row| {
                row.get(0)
            })
            .unwrap()
    }
}
