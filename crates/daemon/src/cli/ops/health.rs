use clap::Args;
use reqwest::Client;
use url::Url;

use strata_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

async fn fetch_status(client: &Client, base: &Url, path: &str) -> String {
    let url = match base.join(path) {
        Ok(url) => url,
        Err(e) => return format!("BAD URL ({})", e),
    };
    match client.get(url).send().await {
        Ok(resp) if resp.status().is_success() => "OK".to_string(),
        Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
        Err(_) => "NOT REACHABLE".to_string(),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = std::convert::Infallible;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        // 1. Check config directory
        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.strata_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                let db = if state.db_path.exists() { "OK" } else { "not created yet" };
                lines.push(format!("  db.sqlite:    {}", db));
                lines.push(format!("  api_port:     {}", state.config.api_port));
                lines.push(format!("  admin_port:   {}", state.config.admin_port));
                lines.push(format!("  max_buckets:  {}", state.config.max_buckets));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        // 2. Check both listeners
        for (name, api) in [("Daemon", &ctx.client), ("Admin", &ctx.admin)] {
            let base = api.base_url();
            let client = api.http_client();

            lines.push(String::new());
            lines.push(format!("{} ({}):", name, base));
            lines.push(format!(
                "  livez:  {}",
                fetch_status(client, base, "/_status/livez").await
            ));
            lines.push(format!(
                "  readyz: {}",
                fetch_status(client, base, "/_status/readyz").await
            ));
        }

        Ok(lines.join("\n"))
    }
}
