use crate::domain::constants::{DEFAULT_API_URL, DEFAULT_TAILNET};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "ts-acl-hosts-gen",
    version,
    about = "Write tailnet device names into the hosts section of a HuJSON ACL policy"
)]
pub struct Cli {
    #[arg(long, help = "Output machine-readable JSON")]
    pub json: bool,
    #[arg(short, long, help = "Log file and API steps to stderr")]
    pub verbose: bool,
    #[arg(long, env = "TS_API_KEY", hide_env_values = true, help = "Tailscale API key")]
    pub api_key: Option<String>,
    #[arg(
        long,
        env = "TS_OAUTH_ID",
        hide_env_values = true,
        help = "Tailscale OAuth client ID"
    )]
    pub oauth_id: Option<String>,
    #[arg(
        long,
        env = "TS_OAUTH_SECRET",
        hide_env_values = true,
        help = "Tailscale OAuth client secret"
    )]
    pub oauth_secret: Option<String>,
    #[arg(
        long,
        env = "TS_TAILNET",
        default_value = DEFAULT_TAILNET,
        help = "Tailnet to list (\"-\" is the tailnet owning the credentials)"
    )]
    pub tailnet: String,
    #[arg(
        long,
        env = "TS_API_URL",
        default_value = DEFAULT_API_URL,
        help = "Tailscale API base URL"
    )]
    pub api_url: String,
    #[arg(value_name = "POLICY", help = "HuJSON policy file to update (created if missing)")]
    pub policy: PathBuf,
}
