use api_smoke::common::{error_line, success};
use api_smoke::config::{cli, Config, ConfigFile};
use api_smoke::Smoke;

use dotenv::dotenv;
use std::process::exit;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Before clap runs, so SMOKE_* values from .env are seen as env vars
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_smoke=warn,smoke_requests=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = cli().get_matches();
    let config = match ConfigFile::load().and_then(|file| Config::from_matches(&matches, &file)) {
        Ok(config) => config,
        Err(e) => {
            error_line(&e.to_string());
            exit(1);
        }
    };
    let strict = config.strict;

    let smoke = match Smoke::new(config) {
        Ok(smoke) => smoke,
        Err(e) => {
            error_line(&e.to_string());
            exit(1);
        }
    };

    let report = match smoke.run().await {
        Ok(report) => report,
        Err(e) => {
            error_line(&e.to_string());
            exit(1);
        }
    };

    if report.all_passed() {
        success("Every step met its expectation.");
    } else if strict {
        error_line(&format!(
            "{} of {} steps didn't pass.",
            report.outcomes.len() - report.passed(),
            report.outcomes.len()
        ));
        exit(1);
    }
}
