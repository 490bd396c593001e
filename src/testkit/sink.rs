//! In-memory sink with the same write semantics as the real ones.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Category, Record};
use crate::error::{Error, Result};
use crate::port::{Sink, SinkRole};

#[derive(Debug, Default)]
struct State {
    rows: BTreeMap<(Category, String), Record>,
    writes: usize,
    fail_on: Vec<usize>,
    fail_always: bool,
}

impl State {
    /// Count a write attempt and decide whether it is injected to fail.
    fn attempt(&mut self) -> Result<()> {
        self.writes += 1;
        if self.fail_always || self.fail_on.contains(&self.writes) {
            return Err(Error::Database(format!("injected failure on write {}", self.writes)));
        }
        Ok(())
    }
}

/// Records keyed by (category, natural key).
#[derive(Debug)]
pub struct MemorySink {
    name: &'static str,
    role: SinkRole,
    state: Mutex<State>,
}

impl MemorySink {
    pub fn primary(name: &'static str) -> Self {
        Self::new(name, SinkRole::Primary)
    }

    pub fn mirror(name: &'static str) -> Self {
        Self::new(name, SinkRole::Mirror)
    }

    fn new(name: &'static str, role: SinkRole) -> Self {
        Self {
            name,
            role,
            state: Mutex::new(State::default()),
        }
    }

    /// Fail the `n`th write call (1-based).
    pub fn fail_on_write(&self, n: usize) {
        self.state.lock().fail_on.push(n);
    }

    pub fn fail_always(&self) {
        self.state.lock().fail_always = true;
    }

    pub fn len(&self) -> usize {
        self.state.lock().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows of one category.
    pub fn records(&self, category: Category) -> Vec<Record> {
        self.state
            .lock()
            .rows
            .iter()
            .filter(|((c, _), _)| *c == category)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn get(&self, category: Category, key: &str) -> Option<Record> {
        self.state
            .lock()
            .rows
            .get(&(category, key.to_string()))
            .cloned()
    }

    /// Number of write calls made, including failed ones.
    pub fn write_count(&self) -> usize {
        self.state.lock().writes
    }
}

#[async_trait]
impl Sink for MemorySink {
    fn name(&self) -> &'static str {
        self.name
    }

    fn role(&self) -> SinkRole {
        self.role
    }

    async fn upsert(&self, record: &Record) -> Result<()> {
        let mut state = self.state.lock();
        state.attempt()?;
        state
            .rows
            .insert((record.category(), record.key()), record.clone());
        Ok(())
    }

    async fn insert_or_ignore(&self, record: &Record) -> Result<bool> {
        let mut state = self.state.lock();
        state.attempt()?;
        let key = (record.category(), record.key());
        if state.rows.contains_key(&key) {
            return Ok(false);
        }
        state.rows.insert(key, record.clone());
        Ok(true)
    }
}
