use serde::Deserialize;

/// RFC 7807 problem body the backend returns for failed requests.
#[derive(Debug, Default, Deserialize)]
pub struct ProblemDetail {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    /// Translation key such as `error.idexists`.
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub params: Option<String>,
}

impl ProblemDetail {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    /// Most specific human-readable description available.
    pub fn summary(&self) -> Option<String> {
        let text = self
            .detail
            .as_deref()
            .or(self.title.as_deref())
            .or(self.message.as_deref())?;
        Some(match &self.message {
            Some(key) if key != text => format!("{} [{}]", text, key),
            _ => text.to_string(),
        })
    }
}
