use crate::cli::{actions::Action, globals::GlobalArgs};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let backend_url = matches
        .get_one::<String>("backend-url")
        .cloned()
        .context("missing required argument: --backend-url")?;

    let anon_key = matches
        .get_one::<String>("anon-key")
        .cloned()
        .context("missing required argument: --anon-key")?;

    let service_key = matches
        .get_one::<String>("service-key")
        .cloned()
        .context("missing required argument: --service-key")?;

    let site_url = matches
        .get_one::<String>("site-url")
        .cloned()
        .unwrap_or_else(|| "http://localhost:5173".to_string());

    let mut globals = GlobalArgs::new(backend_url, site_url);
    globals.anon_key = SecretString::from(anon_key);
    globals.service_key = SecretString::from(service_key);

    Ok(Action::Server { port, globals })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn handler_builds_server_action() {
        let matches = commands::new().get_matches_from(vec![
            "monujo-auth",
            "--port",
            "9090",
            "--backend-url",
            "https://abc123.backend.dev",
            "--anon-key",
            "anon",
            "--service-key",
            "service",
            "--site-url",
            "https://app.monujo.app",
        ]);

        let action = handler(&matches).expect("handler should succeed");
        let Action::Server { port, globals } = action;
        assert_eq!(port, 9090);
        assert_eq!(globals.backend_url, "https://abc123.backend.dev");
        assert_eq!(globals.site_url, "https://app.monujo.app");
        assert_eq!(globals.anon_key.expose_secret(), "anon");
        assert_eq!(globals.service_key.expose_secret(), "service");
    }
}
