//! Unified access token: versioned container of signed service grants
//!
//! A token is built as a plain value (header fields plus an ordered list of
//! service grants), serialized once into a canonical byte sequence, signed
//! with an HMAC-SHA256 chain keyed off the app certificate, zlib-compressed
//! and base64-encoded behind the `007` version marker. Built tokens are
//! never mutated; the remote platform validates them without any server-side
//! state on our end.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::packer::{Reader, pack_string, pack_u16, pack_u32};
use crate::errors::{AppError, AppResult};

type HmacSha256 = Hmac<Sha256>;

/// Version marker prefixed to every encoded token
pub const TOKEN_VERSION: &str = "007";

/// Service type identifier for RTC (audio/video channel) grants
pub const SERVICE_TYPE_RTC: u16 = 1;
/// Service type identifier for RTM (messaging/presence) grants
pub const SERVICE_TYPE_RTM: u16 = 2;

/// Privilege kinds for the RTC service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum RtcPrivilege {
    JoinChannel = 1,
    PublishAudioStream = 2,
    PublishVideoStream = 3,
    PublishDataStream = 4,
}

/// Privilege kinds for the RTM service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum RtmPrivilege {
    Login = 1,
}

/// Privileges granted to one service identity, keyed by privilege kind.
///
/// A `BTreeMap` keeps the wire order canonical: privileges are always
/// serialized sorted ascending by kind.
pub type PrivilegeSet = BTreeMap<u16, u32>;

/// The set of privileges a token grants for one service and one identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceGrant {
    /// RTC grant bound to a channel and a numeric uid (packed as its decimal
    /// string form; uid 0 packs as the empty string, meaning "any uid")
    Rtc {
        channel: String,
        uid: String,
        privileges: PrivilegeSet,
    },
    /// RTM grant bound to a user-id string
    Rtm {
        user_id: String,
        privileges: PrivilegeSet,
    },
}

impl ServiceGrant {
    /// RTC grant for `(channel, uid)`; uid 0 is packed as the empty string
    pub fn rtc(channel: &str, uid: u32, privileges: PrivilegeSet) -> Self {
        let uid = if uid == 0 { String::new() } else { uid.to_string() };
        ServiceGrant::Rtc {
            channel: channel.to_string(),
            uid,
            privileges,
        }
    }

    /// RTM grant for `user_id`
    pub fn rtm(user_id: &str, privileges: PrivilegeSet) -> Self {
        ServiceGrant::Rtm {
            user_id: user_id.to_string(),
            privileges,
        }
    }

    pub fn service_type(&self) -> u16 {
        match self {
            ServiceGrant::Rtc { .. } => SERVICE_TYPE_RTC,
            ServiceGrant::Rtm { .. } => SERVICE_TYPE_RTM,
        }
    }

    pub fn privileges(&self) -> &PrivilegeSet {
        match self {
            ServiceGrant::Rtc { privileges, .. } | ServiceGrant::Rtm { privileges, .. } => {
                privileges
            }
        }
    }

    fn pack(&self, buf: &mut Vec<u8>) -> AppResult<()> {
        pack_u16(buf, self.service_type());
        let privileges = self.privileges();
        let count = u16::try_from(privileges.len())
            .map_err(|_| AppError::Encoding("too many privileges in grant".to_string()))?;
        pack_u16(buf, count);
        for (&kind, &expire) in privileges {
            pack_u16(buf, kind);
            pack_u32(buf, expire);
        }
        match self {
            ServiceGrant::Rtc { channel, uid, .. } => {
                pack_string(buf, channel)?;
                pack_string(buf, uid)?;
            }
            ServiceGrant::Rtm { user_id, .. } => {
                pack_string(buf, user_id)?;
            }
        }
        Ok(())
    }

    fn unpack(reader: &mut Reader<'_>) -> AppResult<Self> {
        let service_type = reader.read_u16()?;
        let count = reader.read_u16()?;
        let mut privileges = PrivilegeSet::new();
        for _ in 0..count {
            let kind = reader.read_u16()?;
            let expire = reader.read_u32()?;
            privileges.insert(kind, expire);
        }
        match service_type {
            SERVICE_TYPE_RTC => Ok(ServiceGrant::Rtc {
                channel: reader.read_string()?,
                uid: reader.read_string()?,
                privileges,
            }),
            SERVICE_TYPE_RTM => Ok(ServiceGrant::Rtm {
                user_id: reader.read_string()?,
                privileges,
            }),
            other => Err(AppError::Encoding(format!(
                "unknown service type {other} in token"
            ))),
        }
    }
}

/// Versioned, immutable token value: header fields plus ordered grants.
///
/// Build-then-discard: construct the full value, call [`AccessToken::build`]
/// once, and hand out the resulting string. The signature covers every field
/// except itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub app_id: String,
    /// Unix seconds captured once at construction
    pub issue_ts: u32,
    /// Validity window in seconds, relative to `issue_ts`
    pub expire: u32,
    /// Random per-token salt; keys the signing chain, never reused
    pub salt: u32,
    pub services: Vec<ServiceGrant>,
}

fn hmac_sign(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

impl AccessToken {
    /// Canonical byte sequence covered by the signature
    fn signing_info(&self) -> AppResult<Vec<u8>> {
        let mut buf = Vec::new();
        pack_string(&mut buf, &self.app_id)?;
        pack_u32(&mut buf, self.issue_ts);
        pack_u32(&mut buf, self.expire);
        pack_u32(&mut buf, self.salt);
        let count = u16::try_from(self.services.len())
            .map_err(|_| AppError::Encoding("too many service grants".to_string()))?;
        pack_u16(&mut buf, count);
        for service in &self.services {
            service.pack(&mut buf)?;
        }
        Ok(buf)
    }

    /// Signing key derived from the certificate, issue timestamp and salt
    fn signing_key(&self, app_certificate: &str) -> Vec<u8> {
        let issued = hmac_sign(&self.issue_ts.to_le_bytes(), app_certificate.as_bytes());
        hmac_sign(&self.salt.to_le_bytes(), &issued)
    }

    /// Serializes, signs and encodes the token into its transport string.
    ///
    /// Deterministic for a fixed `(issue_ts, salt)` pair.
    pub fn build(&self, app_certificate: &str) -> AppResult<String> {
        if self.app_id.is_empty() {
            return Err(AppError::InvalidArgument("app id is required".to_string()));
        }
        if app_certificate.is_empty() {
            return Err(AppError::InvalidArgument(
                "app certificate is required".to_string(),
            ));
        }

        let signing_info = self.signing_info()?;
        let signature = hmac_sign(&self.signing_key(app_certificate), &signing_info);

        let mut content = Vec::with_capacity(signing_info.len() + signature.len() + 2);
        super::packer::pack_bytes(&mut content, &signature)?;
        content.extend_from_slice(&signing_info);

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&content)
            .and_then(|_| encoder.finish())
            .map(|compressed| format!("{TOKEN_VERSION}{}", BASE64.encode(compressed)))
            .map_err(|e| AppError::Internal(format!("token compression failed: {e}")))
    }

    /// Decodes a token string back into its value form.
    ///
    /// The embedded signature is not verified (only the platform holds that
    /// responsibility); parsing exists so tests and diagnostics can inspect
    /// header fields and grants, and re-encode with the same certificate to
    /// check byte-identical output.
    pub fn parse(token: &str) -> AppResult<AccessToken> {
        let encoded = token.strip_prefix(TOKEN_VERSION).ok_or_else(|| {
            AppError::Encoding(format!("unsupported token version, expected {TOKEN_VERSION}"))
        })?;
        let compressed = BASE64
            .decode(encoded)
            .map_err(|e| AppError::Encoding(format!("invalid token base64: {e}")))?;

        let mut content = Vec::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_end(&mut content)
            .map_err(|e| AppError::Encoding(format!("invalid token payload: {e}")))?;

        let mut reader = Reader::new(&content);
        let _signature = reader.read_bytes()?;
        let app_id = reader.read_string()?;
        let issue_ts = reader.read_u32()?;
        let expire = reader.read_u32()?;
        let salt = reader.read_u32()?;
        let count = reader.read_u16()?;
        let mut services = Vec::with_capacity(count as usize);
        for _ in 0..count {
            services.push(ServiceGrant::unpack(&mut reader)?);
        }
        if reader.remaining() != 0 {
            return Err(AppError::Encoding(
                "trailing bytes after token services".to_string(),
            ));
        }

        Ok(AccessToken {
            app_id,
            issue_ts,
            expire,
            salt,
            services,
        })
    }
}
