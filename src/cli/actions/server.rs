use crate::api;
use crate::cli::actions::Action;
use anyhow::{Context, Result};
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, globals } => {
            // Fail fast on URLs the clients would choke on later.
            Url::parse(&globals.backend_url)
                .with_context(|| format!("Invalid backend URL: {}", globals.backend_url))?;
            Url::parse(&globals.site_url)
                .with_context(|| format!("Invalid site URL: {}", globals.site_url))?;

            api::new(port, &globals).await?;
        }
    }

    Ok(())
}
