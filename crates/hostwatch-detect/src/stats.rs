use std::collections::BTreeMap;
use std::fmt;

/// A single observational value recorded during a scan
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatValue {
    Count(usize),
    Text(String),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Named counters and messages describing the last scan passes
#[derive(Clone, Debug, Default)]
pub struct ScanStats {
    values: BTreeMap<String, StatValue>,
}

impl ScanStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_count(&mut self, key: impl Into<String>, value: usize) {
        self.values.insert(key.into(), StatValue::Count(value));
    }

    pub fn set_text(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), StatValue::Text(value.into()));
    }

    /// Record a per-source error under `error_<source>`
    pub fn record_error(&mut self, source: &str, message: impl Into<String>) {
        self.set_text(format!("error_{}", source), message);
    }

    pub fn get(&self, key: &str) -> Option<&StatValue> {
        self.values.get(key)
    }

    pub fn count(&self, key: &str) -> Option<usize> {
        match self.values.get(key)? {
            StatValue::Count(n) => Some(*n),
            StatValue::Text(_) => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.values.get(key)? {
            StatValue::Text(s) => Some(s),
            StatValue::Count(_) => None,
        }
    }

    /// Error entries recorded for individual sources
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().filter_map(|(k, v)| match v {
            StatValue::Text(msg) if k.starts_with("error_") || k.ends_with("_error") => {
                Some((k.as_str(), msg.as_str()))
            }
            _ => None,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StatValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
