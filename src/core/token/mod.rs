//! Unified access-token construction and signing
//!
//! The only part of this service with real algorithmic content: a compact,
//! versioned, signed binary credential embedding RTC and RTM service grants
//! with independent privilege expirations, encoded as a transport-safe
//! string. The wire format must match the platform's published AccessToken2
//! layout bit for bit, or the remote verifier rejects the credential.
//!
//! - `packer`: little-endian, length-prefixed serialization primitives
//! - `access_token`: the token value type, grants, sign/encode and decode
//! - `builder`: the `build_token` operation minting an RTC+RTM credential
//!   for one channel/user pair

mod access_token;
mod builder;
mod packer;

pub use access_token::{
    AccessToken, PrivilegeSet, RtcPrivilege, RtmPrivilege, SERVICE_TYPE_RTC, SERVICE_TYPE_RTM,
    ServiceGrant, TOKEN_VERSION,
};
pub use builder::{
    DEFAULT_TOKEN_VALIDITY_SECS, MintedToken, UserId, build_token, build_token_at, unix_now,
};
