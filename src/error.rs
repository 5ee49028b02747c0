#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::error::Error),

    #[error("Http error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Json error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Io error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid mail address: {0}")]
    MailAddressError(#[from] lettre::address::AddressError),

    #[error("Mail build error: {0}")]
    MailBuildError(#[from] lettre::error::Error),

    #[error("Smtp error: {0}")]
    SmtpError(#[from] lettre::transport::smtp::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("{service} rejected the request ({status}): {body}")]
    Rejected {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0}")]
    UnexpectedResponse(String),
}
