use crate::domain::model::binding_local_name;
use crate::utils::error::{Result, WcsError};
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// 由 DCP 綁定標籤 (`Get`、`Post`、`{uri}Get`) 取得 HTTP 動詞
    pub fn from_binding(tag: &str) -> Option<Self> {
        match binding_local_name(tag).to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            _ => None,
        }
    }
}

/// Appends an encoded query to a URL that may already carry one.
pub fn join_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    if !url.contains('?') {
        format!("{}?{}", url, query)
    } else if url.ends_with('?') || url.ends_with('&') {
        format!("{}{}", url, query)
    } else {
        format!("{}&{}", url, query)
    }
}

/// Thin opener around a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// GET 時參數接在查詢字串上，POST 時以 form-urlencoded 送出
    pub async fn open(
        &self,
        url: &str,
        data: Option<&str>,
        method: HttpMethod,
        cookie: Option<&str>,
        timeout: Duration,
    ) -> Result<Response> {
        let mut request = match method {
            HttpMethod::Get => {
                let target = join_query(url, data.unwrap_or_default());
                tracing::debug!("📡 GET {}", target);
                self.client.get(target)
            }
            HttpMethod::Post => {
                tracing::debug!("📡 POST {} ({} bytes)", url, data.map_or(0, str::len));
                self.client
                    .post(url)
                    .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(data.unwrap_or_default().to_string())
            }
        };

        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.timeout(timeout).send().await?;
        let status = response.status();
        tracing::debug!("📡 Response status: {}", status);

        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await?;
            return Err(WcsError::ServiceException {
                message: body.trim().to_string(),
                xml: body,
            });
        }

        Ok(response.error_for_status()?)
    }

    /// Opens `url` with a plain GET and returns the body as text.
    pub async fn get_text(&self, url: &str, cookie: Option<&str>, timeout: Duration) -> Result<String> {
        let response = self.open(url, None, HttpMethod::Get, cookie, timeout).await?;
        Ok(response.text().await?)
    }
}
