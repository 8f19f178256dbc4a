//! Rendering of [`Query`] values into parameterized SQL.
//!
//! Every identifier is validated before it reaches the SQL text; values are
//! always emitted as placeholders and returned alongside the statement.

use crate::changes::Changes;
use crate::query::{Condition, Direction, Query};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    #[default]
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders with backtick quoting.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => '"',
        }
    }

    /// Whether `INSERT ... RETURNING` is available.
    pub fn supports_returning(self) -> bool {
        !matches!(self, Dialect::MySql)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Validate identifiers against a conservative pattern.
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    #[default]
    Quote,
}

/// A rendered statement: SQL text plus its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
    EmptyChangeSet,
    RowShape { expected: usize, found: usize },
    Unsupported(&'static str),
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            QueryError::EmptyChangeSet => write!(f, "Update has no columns to set"),
            QueryError::RowShape { expected, found } => {
                write!(f, "Insert row has {found} values, expected {expected}")
            }
            QueryError::Unsupported(what) => write!(f, "Unsupported statement: {what}"),
        }
    }
}

impl std::error::Error for QueryError {}

/// Turns [`Query`] values into [`Statement`]s for one SQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlRenderer {
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

impl SqlRenderer {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            identifier_policy: IdentifierPolicy::Quote,
        }
    }

    /// Configure identifier quoting behavior.
    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Build a SELECT of `columns` honoring the query's conditions, order,
    /// limit and offset.
    pub fn select(&self, query: &Query, columns: &[&str]) -> Result<Statement, QueryError> {
        let table = self.identifier(query.table(), false, "table")?;
        let columns = self.column_list(columns)?;
        let mut w = Writer::new(self, format!("SELECT {columns} FROM {table}"));
        w.append_where(query)?;
        w.append_order(query)?;
        w.append_limit_offset(query);
        Ok(w.finish())
    }

    /// Build a COUNT over the query's conditions; order and paging are ignored.
    pub fn count(&self, query: &Query) -> Result<Statement, QueryError> {
        let table = self.identifier(query.table(), false, "table")?;
        let mut w = Writer::new(self, format!("SELECT COUNT(*) FROM {table}"));
        w.append_where(query)?;
        Ok(w.finish())
    }

    pub fn update(&self, query: &Query, changes: &Changes) -> Result<Statement, QueryError> {
        if changes.is_empty() {
            return Err(QueryError::EmptyChangeSet);
        }
        let table = self.identifier(query.table(), false, "table")?;
        let mut w = Writer::new(self, format!("UPDATE {table} SET "));
        let mut first = true;
        for (column, value) in changes.iter() {
            if !first {
                w.sql.push_str(", ");
            }
            first = false;
            let column = self.identifier(column, false, "column")?;
            let placeholder = w.bind(value.clone());
            w.sql.push_str(&format!("{column} = {placeholder}"));
        }
        w.append_where(query)?;
        Ok(w.finish())
    }

    pub fn delete(&self, query: &Query) -> Result<Statement, QueryError> {
        let table = self.identifier(query.table(), false, "table")?;
        let mut w = Writer::new(self, format!("DELETE FROM {table}"));
        w.append_where(query)?;
        Ok(w.finish())
    }

    /// Build a multi-row INSERT, optionally returning the `returning` column.
    ///
    /// With no columns at all a single `DEFAULT VALUES` row is emitted.
    pub fn insert(
        &self,
        table: &str,
        columns: &[&str],
        rows: &[Vec<Value>],
        returning: Option<&str>,
    ) -> Result<Statement, QueryError> {
        let table = self.identifier(table, false, "table")?;
        let mut w = if columns.is_empty() {
            if rows.len() != 1 {
                return Err(QueryError::Unsupported("multi-row insert without columns"));
            }
            Writer::new(self, format!("INSERT INTO {table} DEFAULT VALUES"))
        } else {
            let column_list = self.column_list(columns)?;
            let mut w = Writer::new(self, format!("INSERT INTO {table} ({column_list}) VALUES "));
            for (i, row) in rows.iter().enumerate() {
                if row.len() != columns.len() {
                    return Err(QueryError::RowShape {
                        expected: columns.len(),
                        found: row.len(),
                    });
                }
                if i > 0 {
                    w.sql.push_str(", ");
                }
                let placeholders: Vec<_> = row.iter().map(|v| w.bind(v.clone())).collect();
                w.sql.push_str(&format!("({})", placeholders.join(", ")));
            }
            w
        };
        if let Some(column) = returning {
            if !self.dialect.supports_returning() {
                return Err(QueryError::Unsupported("RETURNING on this dialect"));
            }
            let column = self.identifier(column, false, "column")?;
            w.sql.push_str(&format!(" RETURNING {column}"));
        }
        Ok(w.finish())
    }

    fn column_list(&self, columns: &[&str]) -> Result<String, QueryError> {
        let mut out = Vec::with_capacity(columns.len());
        for col in columns {
            out.push(self.identifier(col, true, "column")?);
        }
        Ok(out.join(", "))
    }

    fn identifier(
        &self,
        ident: &str,
        allow_star: bool,
        kind: &'static str,
    ) -> Result<String, QueryError> {
        if !is_valid_identifier(ident, allow_star) {
            return Err(QueryError::InvalidIdentifier {
                kind,
                ident: ident.to_string(),
            });
        }
        match self.identifier_policy {
            IdentifierPolicy::Quote => Ok(quote_identifier(ident, self.dialect, allow_star)),
            IdentifierPolicy::Validate => Ok(ident.to_string()),
        }
    }
}

struct Writer<'r> {
    renderer: &'r SqlRenderer,
    sql: String,
    params: Vec<Value>,
}

impl<'r> Writer<'r> {
    fn new(renderer: &'r SqlRenderer, sql: String) -> Self {
        Self {
            renderer,
            sql,
            params: Vec::new(),
        }
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        self.renderer.dialect.placeholder(self.params.len())
    }

    fn append_where(&mut self, query: &Query) -> Result<(), QueryError> {
        if query.conditions().is_empty() {
            return Ok(());
        }
        self.sql.push_str(" WHERE ");
        let mut first = true;
        for cond in query.conditions() {
            if !first {
                self.sql.push_str(" AND ");
            }
            first = false;
            let col = self.renderer.identifier(cond.column(), false, "column")?;
            let clause = match cond {
                Condition::Eq(_, val) => format!("{col} = {}", self.bind(val.clone())),
                Condition::NotEq(_, val) => format!("{col} != {}", self.bind(val.clone())),
                Condition::Gt(_, val) => format!("{col} > {}", self.bind(val.clone())),
                Condition::Ge(_, val) => format!("{col} >= {}", self.bind(val.clone())),
                Condition::Lt(_, val) => format!("{col} < {}", self.bind(val.clone())),
                Condition::Le(_, val) => format!("{col} <= {}", self.bind(val.clone())),
                Condition::Like(_, pat) => {
                    format!("{col} LIKE {}", self.bind(Value::Text(pat.clone())))
                }
                // An empty set matches nothing.
                Condition::In(_, vals) if vals.is_empty() => "1 = 0".to_string(),
                Condition::In(_, vals) => {
                    let placeholders: Vec<_> = vals.iter().map(|v| self.bind(v.clone())).collect();
                    format!("{col} IN ({})", placeholders.join(", "))
                }
                Condition::IsNull(_) => format!("{col} IS NULL"),
                Condition::IsNotNull(_) => format!("{col} IS NOT NULL"),
            };
            self.sql.push_str(&clause);
        }
        Ok(())
    }

    fn append_order(&mut self, query: &Query) -> Result<(), QueryError> {
        if query.order().is_empty() {
            return Ok(());
        }
        self.sql.push_str(" ORDER BY ");
        let mut clauses = Vec::with_capacity(query.order().len());
        for order in query.order() {
            let col = self.renderer.identifier(&order.column, false, "column")?;
            match order.direction {
                Direction::Asc => clauses.push(format!("{col} ASC")),
                Direction::Desc => clauses.push(format!("{col} DESC")),
            }
        }
        self.sql.push_str(&clauses.join(", "));
        Ok(())
    }

    /// Counts are written as literals, capped at `i64::MAX`: SQLite and
    /// Postgres reject anything wider than a signed 64-bit integer.
    fn append_limit_offset(&mut self, query: &Query) {
        let sql_int = |n: u64| n.min(i64::MAX as u64);
        match (
            query.limit_value().map(sql_int),
            query.offset_value().map(sql_int),
        ) {
            (Some(limit), offset) => {
                self.sql.push_str(&format!(" LIMIT {limit}"));
                if let Some(offset) = offset {
                    self.sql.push_str(&format!(" OFFSET {offset}"));
                }
            }
            (None, Some(offset)) => {
                // SQLite and MySQL only accept OFFSET after a LIMIT.
                match self.renderer.dialect {
                    Dialect::Sqlite => self.sql.push_str(" LIMIT -1"),
                    Dialect::MySql => self.sql.push_str(" LIMIT 18446744073709551615"),
                    Dialect::Generic | Dialect::Postgres => {}
                }
                self.sql.push_str(&format!(" OFFSET {offset}"));
            }
            (None, None) => {}
        }
    }

    fn finish(self) -> Statement {
        Statement {
            sql: self.sql,
            params: self.params,
        }
    }
}

fn is_valid_identifier(ident: &str, allow_star: bool) -> bool {
    if ident.is_empty() {
        return false;
    }
    let parts: Vec<&str> = ident.split('.').collect();
    for (idx, part) in parts.iter().enumerate() {
        if allow_star && *part == "*" {
            return idx + 1 == parts.len();
        }
        if !is_valid_segment(part) {
            return false;
        }
    }
    true
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(ident: &str, dialect: Dialect, allow_star: bool) -> String {
    let quote = dialect.quote_char();
    let parts: Vec<&str> = ident.split('.').collect();
    let last_idx = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            if allow_star && part == "*" && idx == last_idx {
                part.to_string()
            } else {
                format!("{quote}{part}{quote}")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> SqlRenderer {
        SqlRenderer::new(Dialect::Sqlite).identifier_policy(IdentifierPolicy::Validate)
    }

    #[test]
    fn test_simple_select() {
        let stmt = plain().select(&Query::new("users"), &["*"]).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM users");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_complex_select() {
        let q = Query::new("users")
            .where_eq("status", "active")
            .where_like("name", "%alice%")
            .order_by("id", Direction::Asc)
            .limit(10)
            .offset(20);
        let stmt = plain().select(&q, &["id", "name"]).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT id, name FROM users WHERE status = ? AND name LIKE ? ORDER BY id ASC LIMIT 10 OFFSET 20"
        );
        assert_eq!(
            stmt.params,
            vec![Value::Text("active".into()), Value::Text("%alice%".into())]
        );
    }

    #[test]
    fn test_oversized_limit_and_offset_are_capped() {
        let q = Query::new("users").limit(u64::MAX).offset(u64::MAX);
        let stmt = plain().select(&q, &["id"]).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT id FROM users LIMIT 9223372036854775807 OFFSET 9223372036854775807"
        );

        let q = Query::new("users").offset(1 << 63);
        let stmt = plain().select(&q, &["id"]).unwrap();
        assert!(stmt.sql.ends_with(" LIMIT -1 OFFSET 9223372036854775807"));
    }

    #[test]
    fn test_count_ignores_order_and_paging() {
        let q = Query::new("users")
            .where_gt("id", 5u64)
            .order_by("id", Direction::Desc)
            .limit(3);
        let stmt = plain().count(&q).unwrap();
        assert_eq!(stmt.sql, "SELECT COUNT(*) FROM users WHERE id > ?");
        assert_eq!(stmt.params, vec![Value::Int(5)]);
    }

    #[test]
    fn test_postgres_placeholders_and_quoting() {
        let q = Query::new("users")
            .where_eq("status", "active")
            .where_in("role", ["admin", "user"]);
        let stmt = SqlRenderer::new(Dialect::Postgres).select(&q, &["users.*"]).unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT \"users\".* FROM \"users\" WHERE \"status\" = $1 AND \"role\" IN ($2, $3)"
        );
        assert_eq!(stmt.params.len(), 3);
    }

    #[test]
    fn test_update_binds_set_before_where() {
        let q = Query::new("todos").where_eq("id", 4);
        let changes = Changes::new().set("done", true).set("title", "x");
        let stmt = SqlRenderer::new(Dialect::Postgres).update(&q, &changes).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE \"todos\" SET \"done\" = $1, \"title\" = $2 WHERE \"id\" = $3"
        );
        assert_eq!(
            stmt.params,
            vec![Value::Bool(true), Value::Text("x".into()), Value::Int(4)]
        );
    }

    #[test]
    fn test_update_rejects_empty_changes() {
        let err = plain().update(&Query::new("todos"), &Changes::new()).unwrap_err();
        assert_eq!(err, QueryError::EmptyChangeSet);
    }

    #[test]
    fn test_delete_with_empty_in_matches_nothing() {
        let q = Query::new("todos").where_in("id", Vec::<i64>::new());
        let stmt = plain().delete(&q).unwrap();
        assert_eq!(stmt.sql, "DELETE FROM todos WHERE 1 = 0");
    }

    #[test]
    fn test_multi_row_insert_returning() {
        let rows = vec![
            vec![Value::Text("a".into()), Value::Bool(false)],
            vec![Value::Text("b".into()), Value::Bool(true)],
        ];
        let stmt = plain()
            .insert("todos", &["title", "done"], &rows, Some("id"))
            .unwrap();
        assert_eq!(
            stmt.sql,
            "INSERT INTO todos (title, done) VALUES (?, ?), (?, ?) RETURNING id"
        );
        assert_eq!(stmt.params.len(), 4);
    }

    #[test]
    fn test_insert_default_values() {
        let stmt = plain().insert("foos", &[], &[vec![]], Some("id")).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO foos DEFAULT VALUES RETURNING id");
    }

    #[test]
    fn test_insert_row_shape_mismatch() {
        let err = plain()
            .insert("todos", &["title", "done"], &[vec![Value::Null]], None)
            .unwrap_err();
        assert_eq!(err, QueryError::RowShape { expected: 2, found: 1 });
    }

    #[test]
    fn test_sqlite_offset_without_limit() {
        let stmt = plain().select(&Query::new("t").offset(5), &["*"]).unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM t LIMIT -1 OFFSET 5");
    }

    #[test]
    fn test_invalid_identifier() {
        let err = plain()
            .select(&Query::new("users;drop"), &["*"])
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { .. }));

        let err = plain()
            .select(&Query::new("users").where_eq("a b", 1), &["*"])
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { kind: "column", .. }));
    }
}
