use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use url::Url;

use crate::flags::StaticFlags;

pub const ARG_FLAG: &str = "flag";
pub const ARG_FLAGS_URL: &str = "flags-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_FLAG)
                .long(ARG_FLAG)
                .help("Static flag decision as name=bool; repeat or comma separate")
                .env("DISASTER_AUTH_FLAGS")
                .action(ArgAction::Append)
                .value_delimiter(','),
        )
        .arg(
            Arg::new(ARG_FLAGS_URL)
                .long(ARG_FLAGS_URL)
                .help("Base URL of a flag evaluation service; overrides --flag")
                .env("DISASTER_AUTH_FLAGS_URL"),
        )
}

/// Where flag decisions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Static(StaticFlags),
    Remote(String),
}

impl Source {
    /// # Errors
    /// Returns an error on a malformed `--flag` entry or an invalid URL.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        if let Some(url) = matches.get_one::<String>(ARG_FLAGS_URL) {
            Url::parse(url).with_context(|| format!("Invalid flags URL: {url}"))?;
            return Ok(Self::Remote(url.clone()));
        }

        let entries = matches
            .get_many::<String>(ARG_FLAG)
            .map(|values| values.map(String::as_str).collect::<Vec<_>>())
            .unwrap_or_default();

        StaticFlags::parse(entries)
            .context("Invalid --flag value")
            .map(Self::Static)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{ENABLE_DISASTER_MODE, RELEASE_NEW_AUTH};

    fn command() -> Command {
        with_args(Command::new("test"))
    }

    #[test]
    fn no_flags_means_all_off() -> Result<()> {
        temp_env::with_vars_unset(["DISASTER_AUTH_FLAGS", "DISASTER_AUTH_FLAGS_URL"], || {
            let matches = command().get_matches_from(vec!["test"]);
            assert_eq!(Source::parse(&matches)?, Source::Static(StaticFlags::new()));
            Ok(())
        })
    }

    #[test]
    fn repeated_and_comma_separated_flags() -> Result<()> {
        let matches = command().get_matches_from(vec![
            "test",
            "--flag",
            "release-new-auth=true,enable-disaster-mode=false",
            "--flag",
            "other",
        ]);
        let Source::Static(flags) = Source::parse(&matches)? else {
            anyhow::bail!("expected static flags");
        };
        assert!(flags.get(RELEASE_NEW_AUTH));
        assert!(!flags.get(ENABLE_DISASTER_MODE));
        assert!(flags.get("other"));
        Ok(())
    }

    #[test]
    fn flags_from_env() -> Result<()> {
        temp_env::with_var("DISASTER_AUTH_FLAGS", Some("enable-disaster-mode=on"), || {
            let matches = command().get_matches_from(vec!["test"]);
            let Source::Static(flags) = Source::parse(&matches)? else {
                anyhow::bail!("expected static flags");
            };
            assert!(flags.get(ENABLE_DISASTER_MODE));
            Ok(())
        })
    }

    #[test]
    fn malformed_flag_is_rejected() {
        let matches = command().get_matches_from(vec!["test", "--flag", "release-new-auth=maybe"]);
        assert!(Source::parse(&matches).is_err());
    }

    #[test]
    fn flags_url_selects_remote() -> Result<()> {
        let matches =
            command().get_matches_from(vec!["test", "--flags-url", "http://flags.local:9000"]);
        assert_eq!(
            Source::parse(&matches)?,
            Source::Remote("http://flags.local:9000".to_string())
        );
        let matches = command().get_matches_from(vec!["test", "--flags-url", "nope"]);
        assert!(Source::parse(&matches).is_err());
        Ok(())
    }
}
