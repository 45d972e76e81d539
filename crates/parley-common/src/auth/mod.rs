//! Credential verification
//!
//! Credential issuance (registration, login, password handling) lives in the
//! external identity provider. This module only verifies bearer tokens and
//! extracts the user identity they carry; `issue_token` exists for tooling
//! and tests.

mod jwt;

pub use jwt::{Claims, JwtService};
