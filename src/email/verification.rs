//! Email verification tokens.
//!
//! Tokens are 32 random bytes sent to the user hex encoded. Only the SHA-256
//! hash of a token is stored.

use rand::{RngCore, rngs::OsRng};
use rusqlite::{Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    email::{Mailer, Message},
    user::{User, UserID},
};

/// How long a verification token can be used for.
pub const VERIFICATION_TOKEN_LIFETIME: Duration = Duration::hours(24);

const TOKEN_BYTES: usize = 32;

/// Create a new random token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);

    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Replace the user's verification token.
pub fn store_verification_token(
    user_id: UserID,
    token: &str,
    expires_at: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET verification_token = ?1, token_expiration = ?2 WHERE id = ?3",
        (hash_token(token), expires_at, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// The link a user follows to verify their email.
pub fn verification_link(base_url: &str, token: &str) -> String {
    format!("{}/verify-email/{token}", base_url.trim_end_matches('/'))
}

/// Give `user` a fresh verification token and email it to them.
///
/// Any earlier token stops working.
pub fn issue_verification(
    user: &User,
    base_url: &str,
    mailer: &dyn Mailer,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let token = generate_token();
    store_verification_token(user.id, &token, now + VERIFICATION_TOKEN_LIFETIME, connection)?;

    mailer.send(Message {
        to: user.email.clone(),
        subject: "Verify your email address".to_owned(),
        text: format!(
            "Hi {},\n\nOpen the link below to verify your email address:\n\n{}\n\nThe link expires in 24 hours.",
            user.name,
            verification_link(base_url, &token)
        ),
    })
}

/// Mark the user holding `token` as verified.
///
/// # Errors
///
/// Returns [Error::InvalidVerificationToken] if no user holds the token, or
/// [Error::VerificationTokenExpired] if it expired before `now`. An expired
/// token is left in place.
pub fn verify_email(token: &str, now: OffsetDateTime, connection: &Connection) -> Result<UserID, Error> {
    let (user_id, expires_at): (i64, Option<OffsetDateTime>) = connection
        .query_row(
            "SELECT id, token_expiration FROM user WHERE verification_token = ?1",
            [hash_token(token)],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?
        .ok_or(Error::InvalidVerificationToken)?;

    if expires_at.is_none_or(|expires_at| expires_at < now) {
        return Err(Error::VerificationTokenExpired { resent: false });
    }

    connection.execute(
        "UPDATE user SET is_verified = 1, verification_token = NULL, token_expiration = NULL
        WHERE id = ?1",
        [user_id],
    )?;

    Ok(UserID::new(user_id))
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        db::initialize,
        email::RecordingMailer,
        test_utils::create_test_user,
        user::get_user_by_id,
    };

    use super::{
        VERIFICATION_TOKEN_LIFETIME, generate_token, hash_token, issue_verification,
        store_verification_token, verify_email,
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
    }

    #[test]
    fn tokens_are_64_hex_characters_and_unique() {
        let first = generate_token();
        let second = generate_token();

        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn only_the_hash_is_stored() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let now = OffsetDateTime::now_utc();

        store_verification_token(user.id, "abc123", now, &connection).unwrap();

        let stored: String = connection
            .query_row("SELECT verification_token FROM user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, hash_token("abc123"));
        assert_ne!(stored, "abc123");
    }

    #[test]
    fn issued_token_verifies_the_user() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let mailer = RecordingMailer::default();
        let now = OffsetDateTime::now_utc();

        issue_verification(&user, "http://localhost:3000/", &mailer, now, &connection).unwrap();
        let token = mailer.last_token_for("a@example.com").unwrap();

        assert!(mailer.sent()[0]
            .text
            .contains(&format!("http://localhost:3000/verify-email/{token}")));
        assert_eq!(verify_email(&token, now, &connection), Ok(user.id));
        assert!(get_user_by_id(user.id, &connection).unwrap().is_verified);
        assert_eq!(
            verify_email(&token, now, &connection),
            Err(Error::InvalidVerificationToken)
        );
    }

    #[test]
    fn unknown_token_is_invalid() {
        let connection = get_test_connection();

        assert_eq!(
            verify_email("nope", OffsetDateTime::now_utc(), &connection),
            Err(Error::InvalidVerificationToken)
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let connection = get_test_connection();
        let user = create_test_user(&connection, "a@example.com");
        let mailer = RecordingMailer::default();
        let issued_at = OffsetDateTime::now_utc() - VERIFICATION_TOKEN_LIFETIME - Duration::minutes(1);
        issue_verification(&user, "http://localhost:3000", &mailer, issued_at, &connection).unwrap();
        let token = mailer.last_token_for("a@example.com").unwrap();

        assert_eq!(
            verify_email(&token, OffsetDateTime::now_utc(), &connection),
            Err(Error::VerificationTokenExpired { resent: false })
        );
        assert!(!get_user_by_id(user.id, &connection).unwrap().is_verified);
    }
}
