//! High-level token construction for a channel/user pair
//!
//! Builds the unified credential the browser client uses to join both the
//! RTC audio channel and the RTM messaging channel: one RTC grant carrying
//! the four channel privileges and one RTM grant carrying login, all
//! expiring at the same instant.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::access_token::{
    AccessToken, PrivilegeSet, RtcPrivilege, RtmPrivilege, ServiceGrant,
};
use crate::errors::{AppError, AppResult};

/// Default validity window for minted tokens (one hour)
pub const DEFAULT_TOKEN_VALIDITY_SECS: u32 = 3600;

/// User identity as accepted at the HTTP boundary: either a numeric RTC uid
/// or a free-form string. The same logical identity is coerced to each
/// grant's required representation (numeric for RTC, string for RTM).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(u32),
    Text(String),
}

impl UserId {
    /// Parses query/path input: decimal digits become a numeric uid,
    /// anything else stays a string identity.
    pub fn from_request(raw: &str) -> Self {
        match raw.parse::<u32>() {
            Ok(n) => UserId::Numeric(n),
            Err(_) => UserId::Text(raw.to_string()),
        }
    }

    /// Numeric representation required by the RTC grant
    pub fn rtc_uid(&self) -> AppResult<u32> {
        match self {
            UserId::Numeric(n) => Ok(*n),
            UserId::Text(s) => s.parse::<u32>().map_err(|_| {
                AppError::Encoding(format!("uid '{s}' is not a valid numeric RTC uid"))
            }),
        }
    }

    /// String representation required by the RTM grant
    pub fn rtm_user_id(&self) -> String {
        match self {
            UserId::Numeric(n) => n.to_string(),
            UserId::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Numeric(n) => write!(f, "{n}"),
            UserId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for UserId {
    fn from(uid: u32) -> Self {
        UserId::Numeric(uid)
    }
}

impl From<&str> for UserId {
    fn from(uid: &str) -> Self {
        UserId::Text(uid.to_string())
    }
}

/// A minted credential plus its validity window
#[derive(Debug, Clone)]
pub struct MintedToken {
    pub token: String,
    pub expires_in: u32,
}

/// Builds a signed unified token for `(channel, uid)` valid for
/// `validity_secs` from now.
///
/// The issue timestamp is captured once and shared by the token header and
/// every privilege expiry; the salt is freshly random per call.
pub fn build_token(
    app_id: &str,
    app_certificate: &str,
    channel: &str,
    uid: &UserId,
    validity_secs: u32,
) -> AppResult<MintedToken> {
    let issue_ts = unix_now();
    let salt = rand::rng().random_range(1..=99_999_999u32);
    build_token_at(app_id, app_certificate, channel, uid, validity_secs, issue_ts, salt)
}

/// Deterministic variant of [`build_token`] with explicit issue timestamp
/// and salt. Exposed so tests can pin both and compare exact outputs.
pub fn build_token_at(
    app_id: &str,
    app_certificate: &str,
    channel: &str,
    uid: &UserId,
    validity_secs: u32,
    issue_ts: u32,
    salt: u32,
) -> AppResult<MintedToken> {
    if app_id.is_empty() {
        return Err(AppError::InvalidArgument("app id is required".to_string()));
    }
    if app_certificate.is_empty() {
        return Err(AppError::InvalidArgument(
            "app certificate is required".to_string(),
        ));
    }
    if channel.is_empty() {
        return Err(AppError::InvalidArgument("channel is required".to_string()));
    }
    if validity_secs == 0 {
        return Err(AppError::InvalidArgument(
            "token validity must be positive".to_string(),
        ));
    }

    let expire_at = issue_ts.saturating_add(validity_secs);

    let mut rtc_privileges = PrivilegeSet::new();
    for kind in [
        RtcPrivilege::JoinChannel,
        RtcPrivilege::PublishAudioStream,
        RtcPrivilege::PublishVideoStream,
        RtcPrivilege::PublishDataStream,
    ] {
        rtc_privileges.insert(kind as u16, expire_at);
    }

    let mut rtm_privileges = PrivilegeSet::new();
    rtm_privileges.insert(RtmPrivilege::Login as u16, expire_at);

    let token = AccessToken {
        app_id: app_id.to_string(),
        issue_ts,
        expire: validity_secs,
        salt,
        services: vec![
            ServiceGrant::rtc(channel, uid.rtc_uid()?, rtc_privileges),
            ServiceGrant::rtm(&uid.rtm_user_id(), rtm_privileges),
        ],
    };

    Ok(MintedToken {
        token: token.build(app_certificate)?,
        expires_in: validity_secs,
    })
}

/// Current Unix time in seconds, clamped into the u32 the wire format uses
pub fn unix_now() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u32::try_from(d.as_secs()).unwrap_or(u32::MAX))
        .unwrap_or(0)
}
