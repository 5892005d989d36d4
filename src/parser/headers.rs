//! Request header storage.

/// Request headers in arrival order.
///
/// Lookups ignore ASCII case. Inserting a name that is already present
/// (in any case) replaces the earlier entry, so the last occurrence wins.
/// A linear list keeps the footprint small for the handful of headers a
/// typical embedded client sends.
///
/// Names and values read off the wire hold one `char` per received byte
/// (ISO-8859-1), so ASCII reads as usual and [`Headers::get_bytes`]
/// returns the exact bytes of any value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, replacing any earlier header with the same name.
    ///
    /// The replaced entry keeps its position but takes the new name spelling.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => *entry = (name, value),
            None => self.entries.push((name, value)),
        }
    }

    /// Get a header value by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Get a header value as the bytes that were received.
    pub fn get_bytes(&self, name: &str) -> Option<Vec<u8>> {
        self.get(name)
            .map(|value| value.chars().map(|c| u8::try_from(c).unwrap_or(b'?')).collect())
    }

    /// Check if a header exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of distinct headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no headers were received.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}
