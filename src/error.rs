use std::path::PathBuf;

pub type PlumResult<T> = Result<T, PlumError>;

/// Errors from the command-line and settings layers. The growth core
/// itself never fails.
#[derive(thiserror::Error, Debug)]
pub enum PlumError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings at {path}: {source}")]
    Settings {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid root `{0}`, expected x,y,degrees")]
    InvalidRoot(String),

    #[error("invalid canvas size {cols}x{rows}")]
    InvalidSize { cols: u16, rows: u16 },

    #[error("logging setup failed: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_stable() {
        assert!(PlumError::InvalidRoot("1,2".into())
            .to_string()
            .contains("expected x,y,degrees"));
        assert_eq!(
            PlumError::InvalidSize { cols: 0, rows: 3 }.to_string(),
            "invalid canvas size 0x3"
        );
    }

    #[test]
    fn io_errors_convert() {
        let err: PlumError = std::io::Error::other("boom").into();
        assert!(err.to_string().contains("boom"));
    }
}
