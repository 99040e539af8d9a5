use serde_json::Value;

/// Narrow contract for the record store behind the `/db` route. The real
/// backing store lives outside this crate; handlers only ever see this trait.
pub trait DataSource: Send + Sync {
    /// Returns all records, in stable order.
    fn fetch_all(&self) -> anyhow::Result<Vec<Value>>;
}

/// In-memory data source seeded at startup. Rows are cloned on every fetch,
/// so the source itself stays read-only and lock-free.
pub struct MemoryDataSource {
    rows: Vec<Value>,
}

impl MemoryDataSource {
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows }
    }
}

impl Default for MemoryDataSource {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl DataSource for MemoryDataSource {
    fn fetch_all(&self) -> anyhow::Result<Vec<Value>> {
        Ok(self.rows.clone())
    }
}
