//! # Monujo Auth (Authentication Service)
//!
//! `monujo-auth` is the authentication layer of the Monujo personal finance
//! app. The browser UI talks to this service only; this service delegates
//! credential verification, session issuance, OAuth negotiation, password
//! hashing, and email delivery to the hosted backend, and keeps the
//! account-lockout bookkeeping in the `profiles` table on the side.
//!
//! ## Flows
//!
//! - **Sign-up**: input validation, then delegated to the hosted signup
//!   endpoint. The confirmation email links back to the web app, which
//!   exchanges the one-time code through `/v1/auth/callback`.
//! - **Sign-in**: the lockout record is read before the credential check and
//!   written after it. Five consecutive failures lock the account; a locked
//!   account is rejected without a credential check.
//! - **Password reset**: the recovery email is requested anonymously; setting
//!   the new password requires the recovery session token and clears the
//!   lockout record.
//! - **OAuth**: a redirect to the hosted `authorize` endpoint. The handshake
//!   itself is owned by the hosted provider.
//!
//! ## Lockout writes
//!
//! Lockout updates are best-effort: a failed write is logged and never
//! changes the outcome reported to the user.

pub mod api;
pub mod backend;
pub mod cli;
pub mod lockout;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
