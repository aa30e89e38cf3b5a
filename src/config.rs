use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen: String,
    /// Base URL of the tabular store's values API.
    pub sheet_endpoint: String,
    /// Identifier of the backing sheet (spreadsheet id).
    pub sheet_id: String,
    /// Bearer token for the sheet API, if the endpoint requires one.
    pub sheet_api_token: Option<String>,
    /// Secret used to sign session tokens.
    pub token_secret: String,
    /// Session token lifetime in hours.
    pub token_ttl_hours: i64,
    /// Static operator allowlist — emails always granted admin.
    pub admin_allowlist: Vec<String>,
    /// Serve against an in-memory store instead of the sheet API.
    pub dev_mode: bool,
}

fn parse_email_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn load() -> Self {
        Self {
            listen: env::var("DEALDESK_LISTEN").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            sheet_endpoint: env::var("DEALDESK_SHEET_ENDPOINT")
                .unwrap_or_else(|_| "https://sheets.googleapis.com/v4/spreadsheets".into()),
            sheet_id: env::var("DEALDESK_SHEET_ID").unwrap_or_default(),
            sheet_api_token: env::var("DEALDESK_SHEET_API_TOKEN").ok(),
            token_secret: env::var("DEALDESK_TOKEN_SECRET")
                .unwrap_or_else(|_| "dev-only-secret".into()),
            token_ttl_hours: env::var("DEALDESK_TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(24),
            admin_allowlist: env::var("DEALDESK_ADMIN_ALLOWLIST")
                .ok()
                .map_or_else(Vec::new, |v| parse_email_list(&v)),
            dev_mode: env::var("DEALDESK_DEV").ok().is_some_and(|v| v == "true"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_email_list_single() {
        let result = parse_email_list("ops@dealdesk.io");
        assert_eq!(result, vec!["ops@dealdesk.io"]);
    }

    #[test]
    fn parse_email_list_multiple_with_spaces() {
        let result = parse_email_list("a@x.com, b@y.com , c@z.com");
        assert_eq!(result, vec!["a@x.com", "b@y.com", "c@z.com"]);
    }

    #[test]
    fn parse_email_list_lowercases() {
        let result = parse_email_list("Ops@DealDesk.IO");
        assert_eq!(result, vec!["ops@dealdesk.io"]);
    }

    #[test]
    fn parse_email_list_empty_string() {
        assert!(parse_email_list("").is_empty());
    }

    #[test]
    fn default_token_ttl() {
        // Only reliable when DEALDESK_TOKEN_TTL_HOURS is unset (typical in test/CI)
        let config = Config::load();
        if env::var("DEALDESK_TOKEN_TTL_HOURS").is_err() {
            assert_eq!(config.token_ttl_hours, 24);
        }
    }
}
