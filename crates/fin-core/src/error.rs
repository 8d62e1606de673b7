use fin_rpc::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ClientError),

    #[error("Action error: {0}")]
    Action(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "xdg-open missing");
        let err = Error::Io(io_err);
        assert!(err.to_string().contains("IO error"));
        assert!(err.to_string().contains("xdg-open missing"));
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("bad keymap".to_string());
        assert_eq!(err.to_string(), "Config error: bad keymap");
    }

    #[test]
    fn test_error_display_action() {
        let err = Error::Action("pbcopy exited with 1".to_string());
        assert_eq!(err.to_string(), "Action error: pbcopy exited with 1");
    }

    #[test]
    fn test_from_client_error() {
        let err: Error = ClientError::Timeout.into();
        assert!(matches!(err, Error::Provider(ClientError::Timeout)));
        assert_eq!(err.to_string(), "Provider error: Request timeout");
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("\"not a number\"").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
