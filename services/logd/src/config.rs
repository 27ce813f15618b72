use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "logd")]
#[command(about = "Append-only Merkle log server", long_about = None)]
pub struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    /// Backend connection string (Postgres URL or DSN). Opaque to the log
    /// engine; required unless --layout memory.
    #[arg(long, default_value = "")]
    pub conn: String,

    /// Which persisted frontier layout this deployment uses
    #[arg(long, value_enum, default_value = "blob")]
    pub layout: Layout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Layout {
    /// Marshaled frontier blob inside each certificate row
    Blob,
    /// Row-per-entry frontier table alongside the certificate rows
    Rows,
    /// In-memory store, not durable; for demos and tests
    Memory,
}
