//! Email delivery and address verification.

mod endpoints;
mod mailer;
mod verification;

pub use endpoints::{EmailState, resend_verification_endpoint, verify_email_endpoint};
pub use mailer::{LogMailer, Mailer, Message};
pub use verification::{
    VERIFICATION_TOKEN_LIFETIME, generate_token, issue_verification, store_verification_token,
    verification_link, verify_email,
};

#[cfg(test)]
pub use mailer::RecordingMailer;
