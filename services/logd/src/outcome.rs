use axum::http::StatusCode;

/// Terminal state of one add-chain request. Drives the HTTP status, the
/// response line, and the outcome counter label.
#[derive(Debug)]
pub enum Outcome {
    Success,
    BodyRead(String),
    JsonParse(String),
    EmptyChain,
    Base64Decode(String),
    DbLockTimeout,
    TxBegin(String),
    ReadFrontier(String),
    LogCert(String),
    WriteFrontier(String),
    TxCommit(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::BodyRead(_) => "body-read-err",
            Outcome::JsonParse(_) => "json-parse-err",
            Outcome::EmptyChain => "empty-chain",
            Outcome::Base64Decode(_) => "base64-decode-err",
            Outcome::DbLockTimeout => "db-lock-timeout",
            Outcome::TxBegin(_) => "tx-begin-err",
            Outcome::ReadFrontier(_) => "read-frontier-err",
            Outcome::LogCert(_) => "log-cert-err",
            Outcome::WriteFrontier(_) => "write-frontier-err",
            Outcome::TxCommit(_) => "tx-commit-err",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Success => StatusCode::OK,
            Outcome::BodyRead(_)
            | Outcome::JsonParse(_)
            | Outcome::EmptyChain
            | Outcome::Base64Decode(_) => StatusCode::BAD_REQUEST,
            Outcome::DbLockTimeout
            | Outcome::TxBegin(_)
            | Outcome::ReadFrontier(_)
            | Outcome::LogCert(_)
            | Outcome::WriteFrontier(_)
            | Outcome::TxCommit(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Outcome::Success => "success".to_string(),
            Outcome::BodyRead(e) => format!("Failed to read body: {e}"),
            Outcome::JsonParse(e) => format!("Failed to parse body: {e}"),
            Outcome::EmptyChain => "No certificates provided in body".to_string(),
            Outcome::Base64Decode(e) => format!("Base64 decoding failed: {e}"),
            Outcome::DbLockTimeout => "Timed out waiting for DB".to_string(),
            Outcome::TxBegin(e) => format!("Could not get DB transaction: {e}"),
            Outcome::ReadFrontier(e) => format!("Failed to fetch frontier: {e}"),
            Outcome::LogCert(e) => format!("Failed to log certificate: {e}"),
            Outcome::WriteFrontier(e) => format!("Failed to write frontier: {e}"),
            Outcome::TxCommit(e) => format!("Failed to commit changes: {e}"),
        }
    }
}
