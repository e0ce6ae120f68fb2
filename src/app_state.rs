//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use jsonwebtoken::{DecodingKey, EncodingKey};
use rusqlite::Connection;
use time::Duration;

use crate::{
    Error,
    auth::{DEFAULT_TOKEN_DURATION, PasswordHash},
    db::initialize,
    email::Mailer,
};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The key used to sign auth tokens.
    pub encoding_key: EncodingKey,

    /// The key used to verify auth tokens.
    pub decoding_key: DecodingKey,

    /// How long auth tokens are valid for.
    pub token_duration: Duration,

    /// Delivers verification emails.
    pub mailer: Arc<dyn Mailer>,

    /// The address of the client app that verification links point to.
    pub verification_base_url: String,

    /// The bcrypt cost used to hash new passwords.
    pub password_cost: u32,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        local_timezone: &str,
        mailer: Arc<dyn Mailer>,
        verification_base_url: &str,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            db_connection: Arc::new(Mutex::new(db_connection)),
            local_timezone: local_timezone.to_owned(),
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_duration: DEFAULT_TOKEN_DURATION,
            mailer,
            verification_base_url: verification_base_url.to_owned(),
            password_cost: PasswordHash::DEFAULT_COST,
        })
    }

    /// Use `token_duration` for new auth tokens.
    pub fn with_token_duration(mut self, token_duration: Duration) -> Self {
        self.token_duration = token_duration;
        self
    }

    /// Hash new passwords with `password_cost` rounds of bcrypt.
    pub fn with_password_cost(mut self, password_cost: u32) -> Self {
        self.password_cost = password_cost;
        self
    }
}
