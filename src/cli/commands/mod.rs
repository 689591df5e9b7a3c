pub mod auth;
pub mod flags;
pub mod logging;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const ARG_PORT: &str = "port";

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("disaster-auth")
        .about("Signup and login API with flag-gated fault injection")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8000")
                .env("DISASTER_AUTH_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = auth::with_args(command);
    let command = flags::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "disaster-auth");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Signup and login API with flag-gated fault injection".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_port_default_and_override() {
        temp_env::with_var_unset("DISASTER_AUTH_PORT", || {
            let matches = new().get_matches_from(vec!["disaster-auth", "--jwt-secret", "k"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(8000));

            let matches =
                new().get_matches_from(vec!["disaster-auth", "--jwt-secret", "k", "-p", "9090"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(9090));
        });
    }

    #[test]
    fn test_port_from_env() {
        temp_env::with_var("DISASTER_AUTH_PORT", Some("7000"), || {
            let matches = new().get_matches_from(vec!["disaster-auth", "--jwt-secret", "k"]);
            assert_eq!(matches.get_one::<u16>(ARG_PORT).copied(), Some(7000));
        });
    }

    #[test]
    fn test_jwt_secret_required() {
        temp_env::with_var_unset("DISASTER_AUTH_JWT_SECRET", || {
            let result = new().try_get_matches_from(vec!["disaster-auth"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_invalid_port() {
        let result =
            new().try_get_matches_from(vec!["disaster-auth", "--jwt-secret", "k", "-p", "99999"]);
        assert!(result.is_err());
    }
}
