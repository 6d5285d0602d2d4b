use crate::cli::Cli;
use crate::domain::models::SyncReport;
use crate::services::inventory::fetch_hosts;
use crate::services::output::{print_one, progress};
use crate::services::policy::patch_policy;
use crate::services::tailscale::{Credentials, TailscaleClient};
use anyhow::Context;

pub fn handle_sync(cli: &Cli) -> anyhow::Result<()> {
    let credentials = Credentials::resolve(
        cli.api_key.as_deref(),
        cli.oauth_id.as_deref(),
        cli.oauth_secret.as_deref(),
    )?;
    let client = TailscaleClient::new(&cli.api_url, &cli.tailnet, credentials)
        .context("failed to create Tailscale client")?;

    progress(cli.json, "Fetching hosts...");
    let hosts = fetch_hosts(&client)?;

    progress(cli.json, "Formatting policy...");
    let patch = patch_policy(&cli.policy, &hosts)?;

    print_one(cli.json, SyncReport { patch, hosts }, |r| {
        let state = if r.patch.changed {
            "updated"
        } else {
            "unchanged"
        };
        format!(
            "{} {}: {} hosts ({})",
            state,
            r.patch.policy.display(),
            r.patch.host_count,
            r.patch.operation.as_str()
        )
    })
}
