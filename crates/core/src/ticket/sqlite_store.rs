//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use crate::query::{QueryDescriptor, SortOrder};

use super::{
    Comment, CreateCommentRequest, CreateTicketRequest, Ticket, TicketError, TicketPriority,
    TicketStatus, TicketStore, UpdateTicketRequest,
};

const TICKET_COLUMNS: &str = "id, title, description, status, priority, created_at, updated_at";

/// SQLite-backed ticket store.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and
    /// tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path).map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        debug!("Opened ticket database at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                status TEXT NOT NULL,
                priority TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                ticket_id TEXT NOT NULL REFERENCES tickets(id),
                author_name TEXT NOT NULL,
                message TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
            CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority);
            CREATE INDEX IF NOT EXISTS idx_tickets_created_at ON tickets(created_at);
            CREATE INDEX IF NOT EXISTS idx_comments_ticket_id ON comments(ticket_id);
            "#,
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(())
    }

    /// Timestamps are stored at fixed millisecond precision so their
    /// lexicographic order equals their chronological order; the listing
    /// ORDER BY relies on this.
    fn format_timestamp(ts: DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    fn build_where_clause(query: &QueryDescriptor) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = query.status_filter {
            conditions.push("status = ?");
            params.push(Box::new(status.as_str()));
        }

        if let Some(priority) = query.priority_filter {
            conditions.push("priority = ?");
            params.push(Box::new(priority.as_str()));
        }

        if let Some(ref term) = query.search_term {
            // Case-insensitive substring match over title OR description.
            conditions
                .push(r"(LOWER(title) LIKE ? ESCAPE '\' OR LOWER(description) LIKE ? ESCAPE '\')");
            let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    /// `rowid` is the tie-break for identical timestamps; it follows
    /// insertion order, so repeated queries over unchanged data return
    /// identical orderings and consecutive pages never overlap.
    fn order_clause(sort_order: SortOrder) -> &'static str {
        match sort_order {
            SortOrder::Newest => "ORDER BY created_at DESC, rowid DESC",
            SortOrder::Oldest => "ORDER BY created_at ASC, rowid ASC",
        }
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<Ticket> {
        let id: String = row.get(0)?;
        let title: String = row.get(1)?;
        let description: String = row.get(2)?;
        let status_str: String = row.get(3)?;
        let priority_str: String = row.get(4)?;
        let created_at_str: String = row.get(5)?;
        let updated_at_str: String = row.get(6)?;

        // Parse stored values - use defaults if parsing fails (shouldn't
        // happen with data written by this store)
        let status = TicketStatus::parse(&status_str).unwrap_or(TicketStatus::Open);
        let priority = TicketPriority::parse(&priority_str).unwrap_or(TicketPriority::Low);

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Ticket {
            id,
            title,
            description,
            status,
            priority,
            created_at,
            updated_at,
        })
    }

    fn row_to_comment(row: &rusqlite::Row) -> rusqlite::Result<Comment> {
        let id: String = row.get(0)?;
        let ticket_id: String = row.get(1)?;
        let author_name: String = row.get(2)?;
        let message: String = row.get(3)?;
        let created_at_str: String = row.get(4)?;

        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Comment {
            id,
            ticket_id,
            author_name,
            message,
            created_at,
        })
    }

    fn get_locked(conn: &Connection, id: &str) -> Result<Option<Ticket>, TicketError> {
        let sql = format!("SELECT {} FROM tickets WHERE id = ?", TICKET_COLUMNS);
        match conn.query_row(&sql, params![id], Self::row_to_ticket) {
            Ok(ticket) => Ok(Some(ticket)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(TicketError::Database(e.to_string())),
        }
    }
}

/// Escape LIKE wildcards in user-supplied search terms.
fn escape_like(term: &str) -> String {
    term.replace('\\', r"\\")
        .replace('%', r"\%")
        .replace('_', r"\_")
}

impl TicketStore for SqliteTicketStore {
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let now_str = Self::format_timestamp(now);

        conn.execute(
            "INSERT INTO tickets (id, title, description, status, priority, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                request.title,
                request.description,
                request.status.as_str(),
                request.priority.as_str(),
                now_str,
                now_str,
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(Ticket {
            id,
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();
        Self::get_locked(&conn, id)
    }

    fn list(&self, query: &QueryDescriptor) -> Result<Vec<Ticket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(query);

        let sql = format!(
            "SELECT {} FROM tickets {} {} LIMIT ? OFFSET ?",
            TICKET_COLUMNS,
            where_clause,
            Self::order_clause(query.sort_order),
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut all_params: Vec<Box<dyn rusqlite::ToSql>> = params;
        all_params.push(Box::new(query.limit));
        all_params.push(Box::new(query.offset()));

        let param_refs: Vec<&dyn rusqlite::ToSql> = all_params.iter().map(|p| p.as_ref()).collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), Self::row_to_ticket)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut tickets = Vec::new();
        for row_result in rows {
            let ticket = row_result.map_err(|e| TicketError::Database(e.to_string()))?;
            tickets.push(ticket);
        }

        Ok(tickets)
    }

    fn count(&self, query: &QueryDescriptor) -> Result<i64, TicketError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, params) = Self::build_where_clause(query);

        let sql = format!("SELECT COUNT(*) FROM tickets {}", where_clause);

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let count: i64 = conn
            .query_row(&sql, param_refs.as_slice(), |row| row.get(0))
            .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(count)
    }

    fn update(&self, id: &str, update: UpdateTicketRequest) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let current = Self::get_locked(&conn, id)?.ok_or_else(|| {
            TicketError::NotFound(id.to_string())
        })?;

        // An update with no fields changes nothing, including updated_at.
        if update.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        let updated = Ticket {
            title: update.title.unwrap_or(current.title),
            description: update.description.unwrap_or(current.description),
            status: update.status.unwrap_or(current.status),
            priority: update.priority.unwrap_or(current.priority),
            updated_at: now,
            ..current
        };

        conn.execute(
            "UPDATE tickets SET title = ?, description = ?, status = ?, priority = ?, updated_at = ? WHERE id = ?",
            params![
                updated.title,
                updated.description,
                updated.status.as_str(),
                updated.priority.as_str(),
                Self::format_timestamp(now),
                id,
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(updated)
    }

    fn delete(&self, id: &str) -> Result<Ticket, TicketError> {
        let conn = self.conn.lock().unwrap();

        let ticket =
            Self::get_locked(&conn, id)?.ok_or_else(|| TicketError::NotFound(id.to_string()))?;

        // Comments go first so no orphans are left behind.
        conn.execute("DELETE FROM comments WHERE ticket_id = ?", params![id])
            .map_err(|e| TicketError::Database(e.to_string()))?;

        conn.execute("DELETE FROM tickets WHERE id = ?", params![id])
            .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(ticket)
    }

    fn add_comment(
        &self,
        ticket_id: &str,
        request: CreateCommentRequest,
    ) -> Result<Comment, TicketError> {
        let conn = self.conn.lock().unwrap();

        if Self::get_locked(&conn, ticket_id)?.is_none() {
            return Err(TicketError::NotFound(ticket_id.to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO comments (id, ticket_id, author_name, message, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                id,
                ticket_id,
                request.author_name,
                request.message,
                Self::format_timestamp(now),
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(Comment {
            id,
            ticket_id: ticket_id.to_string(),
            author_name: request.author_name,
            message: request.message,
            created_at: now,
        })
    }

    fn list_comments(&self, ticket_id: &str) -> Result<Vec<Comment>, TicketError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, ticket_id, author_name, message, created_at FROM comments WHERE ticket_id = ? ORDER BY created_at ASC, rowid ASC",
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![ticket_id], Self::row_to_comment)
            .map_err(|e| TicketError::Database(e.to_string()))?;

        let mut comments = Vec::new();
        for row_result in rows {
            let comment = row_result.map_err(|e| TicketError::Database(e.to_string()))?;
            comments.push(comment);
        }

        Ok(comments)
    }

    fn delete_comment(&self, comment_id: &str) -> Result<Comment, TicketError> {
        let conn = self.conn.lock().unwrap();

        let comment = match conn.query_row(
            "SELECT id, ticket_id, author_name, message, created_at FROM comments WHERE id = ?",
            params![comment_id],
            Self::row_to_comment,
        ) {
            Ok(comment) => comment,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                return Err(TicketError::CommentNotFound(comment_id.to_string()));
            }
            Err(e) => return Err(TicketError::Database(e.to_string())),
        };

        conn.execute("DELETE FROM comments WHERE id = ?", params![comment_id])
            .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(comment)
    }
}
