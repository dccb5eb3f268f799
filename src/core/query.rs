use url::form_urlencoded;

/// Ordered key/value parameters of an OGC request, optionally anchored to a base URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceQuery {
    base: String,
    pairs: Vec<(String, String)>,
}

impl ServiceQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 拆開服務 URL，保留原有的查詢參數；空值的參數視為不存在
    pub fn from_url(service_url: &str) -> Self {
        match service_url.split_once('?') {
            Some((base, query)) => Self {
                base: base.to_string(),
                pairs: form_urlencoded::parse(query.as_bytes())
                    .filter(|(_, v)| !v.is_empty())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            },
            None => Self {
                base: service_url.to_string(),
                pairs: Vec::new(),
            },
        }
    }

    /// Exact, case-sensitive key match.
    pub fn has(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Appends only when the key is not present yet.
    pub fn push_missing(&mut self, key: &str, value: impl Into<String>) -> bool {
        if self.has(key) {
            return false;
        }
        self.push(key, value);
        true
    }

    /// Replaces the value in place when the key exists, appends otherwise.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }

    pub fn to_url(&self) -> String {
        format!("{}?{}", self.base, self.encode())
    }
}
