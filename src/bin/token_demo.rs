//! Mints and verifies a pair of tokens with the configured maker.
//!
//! $ cargo run --bin token_demo -- --settings=settings/dev.toml

use chrono::Duration;
use lendgate::logger::*;
use lendgate::server::build_token_maker;
use lendgate::settings::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    let cli = Cli::parse();
    let project_settings = parse_settings(cli.settings.as_deref())?;
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;
    info!(token = ?project_settings.token, "loaded token settings");

    let maker = build_token_maker(&project_settings.token)?;

    let ttl = Duration::seconds(project_settings.token.access_token_ttl_secs);
    let (token, payload) = maker.create_token("demo-subject", ttl)?;
    info!(id = %payload.id, expires_at = %payload.expires_at, "minted access token");
    println!("{}", token);

    let verified = maker.verify_token(&token)?;
    info!(subject = %verified.subject, "verified access token");

    let (expired, _) = maker.create_token("demo-subject", Duration::minutes(-1))?;
    match maker.verify_token(&expired) {
        Ok(_) => warn!("expired token unexpectedly verified"),
        Err(e) => info!("expired token rejected: {}", e),
    }

    Ok(())
}
