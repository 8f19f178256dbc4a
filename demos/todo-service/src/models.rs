use serde::{Deserialize, Serialize};
use strata::{Entity, RecordId};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    #[serde(default)]
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub owner: Option<String>,
}

impl Entity for Todo {
    fn table_name() -> &'static str {
        "todos"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "title", "done", "owner"]
    }

    fn id(&self) -> RecordId {
        RecordId::try_from(self.id).unwrap_or_default()
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = i64::try_from(id).unwrap_or(i64::MAX);
    }
}

pub const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    done BOOLEAN NOT NULL DEFAULT 0,
    owner TEXT
)";
