#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use strata_data::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub done: bool,
    pub owner: Option<String>,
}

impl Todo {
    pub fn new(title: &str) -> Self {
        Self {
            id: 0,
            title: title.to_string(),
            done: false,
            owner: None,
        }
    }

    pub fn owned_by(mut self, owner: &str) -> Self {
        self.owner = Some(owner.to_string());
        self
    }
}

impl Entity for Todo {
    fn table_name() -> &'static str {
        "todos"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "title", "done", "owner"]
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }
}

/// A store holding `n` todos with ids `1..=n`; every third one is done.
pub async fn seeded(n: usize) -> MemoryStore<Todo> {
    let store = MemoryStore::new();
    let mut todos: Vec<Todo> = (1..=n)
        .map(|i| Todo {
            done: i % 3 == 0,
            ..Todo::new(&format!("todo {i}"))
        })
        .collect();
    store.insert(&mut todos).await.unwrap();
    store
}

pub fn ids(todos: &[Todo]) -> Vec<u64> {
    todos.iter().map(|t| t.id).collect()
}
