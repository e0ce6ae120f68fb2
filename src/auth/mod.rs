//! Passwords, auth tokens, registration and logging in.

mod jwt;
mod log_in;
mod middleware;
mod password;
mod register;

pub use jwt::{Claims, DEFAULT_TOKEN_DURATION, decode_jwt, encode_jwt};
pub use log_in::{LogInRequest, LogInState, log_in_endpoint};
pub use middleware::{AuthState, auth_guard, user_id_from_headers};
pub use password::{PasswordHash, ValidatedPassword};
pub use register::{RegisterRequest, RegistrationState, register_endpoint};
