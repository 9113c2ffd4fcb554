pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        access_secret: SecretString,
        refresh_secret: SecretString,
        access_ttl_minutes: i64,
        refresh_ttl_days: i64,
        secure_cookies: bool,
    },
}
