use std::net::SocketAddr;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "enginesvc-server")]
#[command(about = "Engine registry HTTP server", long_about = None)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    #[arg(long, env = "ENGINESVC_LISTEN", default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "ENGINESVC_LOG", default_value = "info")]
    pub log: String,
}
