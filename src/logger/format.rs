//! Access log formats: `combined` (Apache/Nginx), `common` (CLF) and `json`.

use chrono::Local;

/// One served request, ready for formatting.
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub status: u16,
    pub body_bytes: u64,
    pub user_agent: Option<String>,
}

impl AccessLogEntry {
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            status: 200,
            body_bytes: 0,
            user_agent: None,
        }
    }

    /// Format according to the configured name; unknown names fall back to
    /// the combined format.
    #[must_use]
    pub fn format(&self, format: &str) -> String {
        match format {
            "common" => self.format_common(),
            "json" => self.format_json(),
            _ => self.format_combined(),
        }
    }

    fn request_line(&self) -> String {
        let query = self
            .query
            .as_ref()
            .map_or_else(String::new, |q| format!("?{q}"));
        format!("{} {}{} HTTP/1.1", self.method, self.path, query)
    }

    /// `$remote_addr - - [$time] "$request" $status $bytes "-" "$user_agent"`
    fn format_combined(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {} \"-\" \"{}\"",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
            self.user_agent.as_deref().unwrap_or("-"),
        )
    }

    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.request_line(),
            self.status,
            self.body_bytes,
        )
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "user_agent": self.user_agent,
        })
        .to_string()
    }
}
