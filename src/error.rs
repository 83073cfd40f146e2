use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("HTTP error, status: {status}")]
    Transport { status: u16 },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Failed to parse JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("Invalid data structure: {detail}")]
    Shape {
        missing: Vec<&'static str>,
        detail: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn missing_fields(missing: Vec<&'static str>) -> Self {
        let detail = format!("missing {}", missing.join(", "));
        DashboardError::Shape { missing, detail }
    }

    pub fn mistyped(detail: impl Into<String>) -> Self {
        DashboardError::Shape {
            missing: Vec::new(),
            detail: detail.into(),
        }
    }

    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::Transport { .. } => "transport",
            DashboardError::Request(_) => "request",
            DashboardError::Format(_) => "format",
            DashboardError::Shape { .. } => "shape",
            DashboardError::Config(_) => "config",
        }
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => DashboardError::Transport {
                status: status.as_u16(),
            },
            None => DashboardError::Request(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_every_field() {
        let err = DashboardError::missing_fields(vec!["workers", "progress"]);
        assert_eq!(err.kind(), "shape");
        assert_eq!(
            err.to_string(),
            "Invalid data structure: missing workers, progress"
        );
        match err {
            DashboardError::Shape { missing, .. } => {
                assert_eq!(missing, vec!["workers", "progress"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn transport_error_carries_status() {
        let err = DashboardError::Transport { status: 500 };
        assert_eq!(err.kind(), "transport");
        assert_eq!(err.to_string(), "HTTP error, status: 500");
    }

    #[test]
    fn format_error_from_serde() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: DashboardError = parse.into();
        assert_eq!(err.kind(), "format");
        assert!(err.to_string().starts_with("Failed to parse JSON"));
    }
}
