//! Web server command.

use std::sync::Arc;

use console::style;

use jobcrawl::config::Settings;
use jobcrawl::scrapers::ChromiumEngine;

/// Start the web server and, unless disabled, the daily scheduler.
pub async fn cmd_serve(settings: &Settings, bind: &str, schedule: bool) -> anyhow::Result<()> {
    let bind = normalize_bind_address(bind);

    println!(
        "{} Starting jobcrawl server at http://{}",
        style("→").cyan(),
        bind
    );
    if schedule && settings.schedule.enabled {
        println!("  Scheduled scrape: {}", settings.schedule.cron);
    }
    println!("  Press Ctrl+C to stop");

    let engine = Arc::new(ChromiumEngine::new(settings.browser.clone()));
    jobcrawl::server::serve(settings, engine, &bind, schedule).await
}

/// Accept a bare port, a bare host, or host:port.
fn normalize_bind_address(bind: &str) -> String {
    if let Ok(port) = bind.parse::<u16>() {
        return format!("127.0.0.1:{}", port);
    }

    if let Some((_, port_str)) = bind.rsplit_once(':') {
        if port_str.parse::<u16>().is_ok() {
            return bind.to_string();
        }
    }

    format!("{}:3000", bind)
}
