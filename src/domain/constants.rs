pub const DEFAULT_API_URL: &str = "https://api.tailscale.com";

/// Tailnet placeholder that resolves to the tailnet owning the credential.
pub const DEFAULT_TAILNET: &str = "-";

pub const OAUTH_SCOPE: &str = "devices:read";

/// Top-level policy key holding the host aliases.
pub const HOSTS_KEY: &str = "hosts";

/// Written when the policy file does not exist yet.
pub const EMPTY_POLICY: &str = "{\n}";

/// Device names must end in these two labels.
pub const MAGIC_DNS_SUFFIX: [&str; 2] = ["ts", "net"];
