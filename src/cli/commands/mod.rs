use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("monujo-auth")
        .about("Authentication service for Monujo")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("MONUJO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("backend-url")
                .short('b')
                .long("backend-url")
                .help("Hosted backend base URL, example: https://abc123.backend.dev")
                .env("MONUJO_BACKEND_URL")
                .required(true),
        )
        .arg(
            Arg::new("anon-key")
                .long("anon-key")
                .help("Publishable API key for the hosted auth API")
                .env("MONUJO_ANON_KEY")
                .required(true),
        )
        .arg(
            Arg::new("service-key")
                .long("service-key")
                .help("Service-role API key for the profiles table, never sent to browsers")
                .env("MONUJO_SERVICE_KEY")
                .required(true),
        )
        .arg(
            Arg::new("site-url")
                .long("site-url")
                .help("Public URL of the web app, used for email and OAuth redirects")
                .default_value("http://localhost:5173")
                .env("MONUJO_SITE_URL"),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("MONUJO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "monujo-auth");
        assert_eq!(
            command.get_about().unwrap().to_string(),
            "Authentication service for Monujo"
        );
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_check_port_and_backend() {
        let command = new();
        let matches = command.get_matches_from(vec![
            "monujo-auth",
            "--port",
            "8080",
            "--backend-url",
            "https://abc123.backend.dev",
            "--anon-key",
            "anon-key",
            "--service-key",
            "service-key",
        ]);

        assert_eq!(matches.get_one::<u16>("port").map(|s| *s), Some(8080));
        assert_eq!(
            matches
                .get_one::<String>("backend-url")
                .map(|s| s.to_string()),
            Some("https://abc123.backend.dev".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("anon-key").map(|s| s.to_string()),
            Some("anon-key".to_string())
        );
        assert_eq!(
            matches
                .get_one::<String>("service-key")
                .map(|s| s.to_string()),
            Some("service-key".to_string())
        );
        assert_eq!(
            matches.get_one::<String>("site-url").map(|s| s.to_string()),
            Some("http://localhost:5173".to_string())
        );
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("MONUJO_BACKEND_URL", Some("https://abc123.backend.dev")),
                ("MONUJO_ANON_KEY", Some("anon_key")),
                ("MONUJO_SERVICE_KEY", Some("service_key")),
                ("MONUJO_SITE_URL", Some("https://app.monujo.app")),
                ("MONUJO_PORT", Some("443")),
                ("MONUJO_LOG_LEVEL", Some("info")),
            ],
            || {
                let command = new();
                let matches = command.get_matches_from(vec!["monujo-auth"]);
                assert_eq!(matches.get_one::<u16>("port").map(|s| *s), Some(443));
                assert_eq!(
                    matches
                        .get_one::<String>("backend-url")
                        .map(|s| s.to_string()),
                    Some("https://abc123.backend.dev".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("site-url").map(|s| s.to_string()),
                    Some("https://app.monujo.app".to_string())
                );
                assert_eq!(matches.get_one::<u8>("verbosity").map(|s| *s), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("MONUJO_LOG_LEVEL", Some(level)),
                    ("MONUJO_BACKEND_URL", Some("https://abc123.backend.dev")),
                    ("MONUJO_ANON_KEY", Some("anon_key")),
                    ("MONUJO_SERVICE_KEY", Some("service_key")),
                ],
                || {
                    let command = new();
                    let matches = command.get_matches_from(vec!["monujo-auth"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").map(|s| *s),
                        Some(index as u8)
                    );
                },
            );
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        // loop cover all possible value_parse
        let levels = vec!["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("MONUJO_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "monujo-auth".to_string(),
                    "--backend-url".to_string(),
                    "https://abc123.backend.dev".to_string(),
                    "--anon-key".to_string(),
                    "anon_key".to_string(),
                    "--service-key".to_string(),
                    "service_key".to_string(),
                ];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let command = new();

                let matches = command.get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>("verbosity").map(|s| *s),
                    Some(index as u8)
                );
            });
        }
    }
}
