use std::collections::HashMap;

/// Multi-valued query-string map: every key keeps all its values in encounter order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
    values: HashMap<String, Vec<String>>,
}

impl QueryValues {
    /// Decode a raw query string (`a=1&b=2&a=3`), percent- and `+`-decoding keys and values.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect()
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.entry(key.into()).or_default().push(value.into());
    }

    /// First value under `key`, or `""` when the key is absent.
    #[must_use]
    pub fn first(&self, key: &str) -> &str {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map_or("", String::as_str)
    }

    #[must_use]
    pub fn all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::default();
        for (key, value) in iter {
            values.append(key, value);
        }
        values
    }
}

impl From<HashMap<String, Vec<String>>> for QueryValues {
    fn from(values: HashMap<String, Vec<String>>) -> Self {
        Self { values }
    }
}
