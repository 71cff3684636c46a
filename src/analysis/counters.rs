use crate::error::AppError;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Static god -> counters table, one line per god:
/// `god,counter1,counter2,...`. The relation is asymmetric.
#[derive(Debug, Default)]
pub struct CounterDatabase {
    counters: HashMap<String, Vec<String>>,
}

impl CounterDatabase {
    /// Missing file yields an empty table; the caller decides whether that
    /// is worth a warning. Any other read failure is surfaced.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(AppError::StoreError(format!(
                    "Cannot read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        Ok(Self::parse(&content))
    }

    fn parse(content: &str) -> Self {
        let mut counters = HashMap::new();
        for line in content.lines() {
            let mut fields = line.split(',').map(str::trim);
            let Some(god) = fields.next().filter(|g| !g.is_empty()) else {
                continue;
            };
            let list: Vec<String> = fields
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
            counters.insert(god.to_string(), list);
        }

        CounterDatabase { counters }
    }

    pub fn counters_of(&self, god: &str) -> &[String] {
        self.counters.get(god).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
