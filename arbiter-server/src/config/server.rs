use clap::Args;

#[derive(Args, Clone, Debug)]
#[command(next_help_heading = "Server Options")]
#[group(id = "Server")]
pub struct Options {
    /// Address and port the API server will bind to.
    #[arg(long = "listen-addr")]
    #[arg(env = "LISTEN_ADDR")]
    #[arg(default_value = "127.0.0.1:9000")]
    pub listen_addr: String,

    /// Address and port the metrics server will bind to.
    #[arg(long = "metrics-addr")]
    #[arg(env = "METRICS_ADDR")]
    #[arg(default_value = "127.0.0.1:9001")]
    pub metrics_addr: String,
}
