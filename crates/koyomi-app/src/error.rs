use thiserror::Error;

/// Launcher-level errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("cannot read {path}: {source}")]
    InputUnavailable {
        path: String,
        source: std::io::Error,
    },
}

impl AppError {
    /// Stable kind name used in `Error: <kind>: <detail>` report lines.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InputUnavailable { .. } => "InputUnavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_input_report_line() {
        let err = AppError::InputUnavailable {
            path: "missing.txt".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(
            format!("Error: {}: {err}", err.kind()),
            "Error: InputUnavailable: cannot read missing.txt: no such file"
        );
    }
}
