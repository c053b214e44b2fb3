use tracing_subscriber::{EnvFilter, fmt};
use tracing::debug;

use parish_access::cli;
use parish_access::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging on stderr so command output stays clean on stdout
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let cfg = Config::from_env()?;
    debug!(
        target: "parish_access",
        "starting: identity_endpoint={:?}, strict_roles={}, timeout_secs={}",
        cfg.identity_endpoint(), cfg.strict_roles, cfg.request_timeout.as_secs()
    );

    let result = match cli::parse_args(std::env::args().skip(1)) {
        Ok(cmd) => cli::run(cmd, &cfg).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(outcome) => {
            println!("{}", outcome.output);
            std::process::exit(outcome.exit_code);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            if e.code_str() == "usage" {
                eprintln!("\n{}", cli::USAGE);
            }
            std::process::exit(e.exit_code());
        }
    }
}
