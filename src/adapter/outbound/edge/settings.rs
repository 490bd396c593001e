//! Edge cache connection settings.

use serde::Deserialize;

/// Location of the edge SQL database.
///
/// The API token is a secret and comes from `EDGE_API_TOKEN`, never the file.
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    pub account_id: String,
    pub database_id: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_url() -> String {
    "https://api.cloudflare.com/client/v4".into()
}

const fn default_timeout_ms() -> u64 {
    10_000
}

impl EdgeConfig {
    /// Query endpoint of the configured database.
    #[must_use]
    pub fn query_url(&self) -> String {
        format!(
            "{}/accounts/{}/d1/database/{}/query",
            self.api_url.trim_end_matches('/'),
            self.account_id,
            self.database_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_joins_account_and_database() {
        let config = EdgeConfig {
            api_url: "https://edge.example/v4/".into(),
            account_id: "acct".into(),
            database_id: "db-1".into(),
            timeout_ms: 1_000,
        };
        assert_eq!(
            config.query_url(),
            "https://edge.example/v4/accounts/acct/d1/database/db-1/query"
        );
    }
}
