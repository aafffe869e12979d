use secrecy::SecretString;

/// Immutable configuration shared by the server: where the hosted backend
/// lives, the two API keys, and the public URL of the web app used for
/// email and OAuth redirects.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub backend_url: String,
    pub anon_key: SecretString,
    pub service_key: SecretString,
    pub site_url: String,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(backend_url: String, site_url: String) -> Self {
        Self {
            backend_url,
            anon_key: SecretString::default(),
            service_key: SecretString::default(),
            site_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            "https://abc.backend.dev".to_string(),
            "https://app.monujo.app".to_string(),
        );
        assert_eq!(args.backend_url, "https://abc.backend.dev");
        assert_eq!(args.site_url, "https://app.monujo.app");
        assert_eq!(args.anon_key.expose_secret(), "");
        assert_eq!(args.service_key.expose_secret(), "");
    }

    #[test]
    fn test_debug_redacts_keys() {
        let mut args = GlobalArgs::new(
            "https://abc.backend.dev".to_string(),
            "https://app.monujo.app".to_string(),
        );
        args.service_key = SecretString::from("super-secret".to_string());
        let rendered = format!("{args:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
