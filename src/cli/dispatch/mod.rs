use crate::cli::actions::Action;
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let secret = |name: &str| -> Result<SecretString> {
        matches
            .get_one::<String>(name)
            .map(|value| SecretString::from(value.clone()))
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{name}"))
    };

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        access_secret: secret("access-secret")?,
        refresh_secret: secret("refresh-secret")?,
        access_ttl_minutes: matches
            .get_one::<i64>("access-ttl-minutes")
            .copied()
            .unwrap_or(15),
        refresh_ttl_days: matches
            .get_one::<i64>("refresh-ttl-days")
            .copied()
            .unwrap_or(7),
        secure_cookies: matches
            .get_one::<bool>("secure-cookies")
            .copied()
            .unwrap_or(true),
    })
}
