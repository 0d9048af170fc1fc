use serde::Deserialize;

/// Default OAuth token endpoint for Google service accounts.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Token the Firebase emulators accept for admin requests.
pub const EMULATOR_ADMIN_TOKEN: &str = "owner";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub firebase_project_id: String,
    pub firebase_client_email: Option<String>,
    pub firebase_private_key: Option<String>,
    pub firebase_access_token: Option<String>,
    pub google_token_uri: String,
    pub firestore_base_url: String,
    pub identity_base_url: String,
    pub crm_base_url: String,
    pub crm_token: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// `from_env` is the production entry point; this exists so the parsing
    /// rules can be exercised without touching the process environment.
    pub fn from_source<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let firestore_emulator = optional("FIRESTORE_EMULATOR_HOST");
        let auth_emulator = optional("FIREBASE_AUTH_EMULATOR_HOST");
        let using_emulators = firestore_emulator.is_some() || auth_emulator.is_some();

        let firebase_access_token = optional("FIREBASE_ACCESS_TOKEN").or_else(|| {
            using_emulators.then(|| EMULATOR_ADMIN_TOKEN.to_string())
        });

        let firebase_client_email = optional("FIREBASE_CLIENT_EMAIL");
        let firebase_private_key =
            optional("FIREBASE_PRIVATE_KEY").map(|key| key.replace("\\n", "\n"));

        if firebase_access_token.is_none()
            && (firebase_client_email.is_none() || firebase_private_key.is_none())
        {
            anyhow::bail!(
                "FIREBASE_CLIENT_EMAIL and FIREBASE_PRIVATE_KEY are required unless FIREBASE_ACCESS_TOKEN or an emulator host is set"
            );
        }

        let config = Self {
            port: var("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            firebase_project_id: var("FIREBASE_PROJECT_ID")
                .ok_or_else(|| anyhow::anyhow!("FIREBASE_PROJECT_ID environment variable required"))
                .and_then(|id| {
                    if id.trim().is_empty() {
                        anyhow::bail!("FIREBASE_PROJECT_ID cannot be empty");
                    }
                    Ok(id)
                })?,
            firebase_client_email,
            firebase_private_key,
            firebase_access_token,
            google_token_uri: optional("GOOGLE_TOKEN_URI")
                .map(|uri| validate_http_url("GOOGLE_TOKEN_URI", uri))
                .transpose()?
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            firestore_base_url: match firestore_emulator {
                Some(host) => format!("http://{}", host),
                None => "https://firestore.googleapis.com".to_string(),
            },
            identity_base_url: match auth_emulator {
                Some(host) => format!("http://{}/identitytoolkit.googleapis.com", host),
                None => "https://identitytoolkit.googleapis.com".to_string(),
            },
            crm_base_url: var("CRM_BASE_URL")
                .ok_or_else(|| anyhow::anyhow!("CRM_BASE_URL environment variable required"))
                .and_then(|url| validate_http_url("CRM_BASE_URL", url))?,
            crm_token: var("CRM_TOKEN")
                .ok_or_else(|| anyhow::anyhow!("CRM_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("CRM_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Firebase project: {}", config.firebase_project_id);
        tracing::debug!("Firestore base URL: {}", config.firestore_base_url);
        tracing::debug!("Identity base URL: {}", config.identity_base_url);
        tracing::debug!("CRM base URL: {}", config.crm_base_url);
        if using_emulators {
            tracing::warn!("Firebase emulator host configured, using emulator credentials");
        }
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}

fn validate_http_url(name: &str, raw: String) -> anyhow::Result<String> {
    if raw.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    let parsed = url::Url::parse(&raw).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(raw.trim_end_matches('/').to_string())
}
