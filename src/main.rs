use std::env;

use sipcalc::api::{DEFAULT_PORT, run_cli, run_http_server};

#[tokio::main]
async fn main() {
    if let Err(e) = sipcalc::logging::init_logging() {
        eprintln!("Warning: failed to initialise logging: {e}");
    }

    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .or_else(|| {
                env::var("SIPCALC_PORT")
                    .ok()
                    .and_then(|s| s.parse::<u16>().ok())
            })
            .unwrap_or(DEFAULT_PORT);
        if let Err(e) = run_http_server(port).await {
            eprintln!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    match run_cli() {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
