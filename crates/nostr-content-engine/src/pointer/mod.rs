//! # Nostr entity pointers (NIP-19)
//!
//! Decodes and encodes the bech32 entity strings that reference profiles,
//! events and addressable events:
//!
//! - `npub` / `note`: a bare 32-byte public key or event id
//! - `nprofile` / `nevent` / `naddr`: a TLV payload with optional relay
//!   hints, author and kind
//!
//! Keys and ids are exchanged as lowercase hex strings. Decoding accepts an
//! optional `nostr:` URI prefix. Secret keys (`nsec`) are deliberately not a
//! recognized prefix.

mod relays;
mod scan;
mod tlv;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use serde::Serialize;
use thiserror::Error;

use tlv::Tlv;

pub use relays::{RelayHints, dedupe_relays, resolve_relays};
pub use scan::{NostrReference, scan_references};

/// URI scheme that may precede an entity in note content (NIP-21).
pub const NOSTR_URI_SCHEME: &str = "nostr:";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unrecognized entity prefix: {0}")]
    UnknownPrefix(String),
    #[error("malformed bech32 string: {0}")]
    Bech32(String),
    #[error("entity strings must be lowercase")]
    NotLowercase,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("invalid {field} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("truncated TLV record")]
    TruncatedTlv,
    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("{field} is not 32 bytes of hex: {value}")]
    InvalidHex { field: &'static str, value: String },
    #[error("{0} does not fit in a TLV record")]
    ValueTooLong(&'static str),
    #[error("{prefix} cannot encode this pointer without losing fields")]
    Unrepresentable { prefix: &'static str },
    #[error("bech32 encoding failed: {0}")]
    Bech32(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Prefix {
    Npub,
    Nprofile,
    Note,
    Nevent,
    Naddr,
}

impl Prefix {
    pub const ALL: [Prefix; 5] = [
        Prefix::Npub,
        Prefix::Nprofile,
        Prefix::Note,
        Prefix::Nevent,
        Prefix::Naddr,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Prefix::Npub => "npub",
            Prefix::Nprofile => "nprofile",
            Prefix::Note => "note",
            Prefix::Nevent => "nevent",
            Prefix::Naddr => "naddr",
        }
    }

    /// Case-insensitive lookup of a human-readable part.
    pub fn parse(hrp: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(hrp))
    }

    /// Prefixes whose payload is a bare 32 bytes.
    pub fn is_bare(self) -> bool {
        matches!(self, Prefix::Npub | Prefix::Note)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePointer {
    pub pubkey: String,
    pub relays: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPointer {
    pub id: String,
    pub kind: Option<u32>,
    pub author: Option<String>,
    pub relays: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressPointer {
    pub identifier: String,
    pub kind: u32,
    pub pubkey: String,
    pub relays: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NostrPointer {
    Profile(ProfilePointer),
    Event(EventPointer),
    Address(AddressPointer),
}

impl NostrPointer {
    pub fn relays(&self) -> &[String] {
        match self {
            NostrPointer::Profile(p) => &p.relays,
            NostrPointer::Event(e) => &e.relays,
            NostrPointer::Address(a) => &a.relays,
        }
    }

    #[must_use]
    pub fn with_relays(mut self, relays: Vec<String>) -> Self {
        match &mut self {
            NostrPointer::Profile(p) => p.relays = relays,
            NostrPointer::Event(e) => e.relays = relays,
            NostrPointer::Address(a) => a.relays = relays,
        }
        self
    }

    /// The richest prefix that can carry this pointer.
    pub fn default_prefix(&self) -> Prefix {
        match self {
            NostrPointer::Profile(_) => Prefix::Nprofile,
            NostrPointer::Event(_) => Prefix::Nevent,
            NostrPointer::Address(_) => Prefix::Naddr,
        }
    }
}

/// A decoded entity together with the exact string it was decoded from
/// (without any `nostr:` prefix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub prefix: Prefix,
    pub pointer: NostrPointer,
    pub bech32: String,
}

impl Entity {
    /// Re-encodes the pointer under the entity's prefix.
    pub fn encode(&self) -> Result<String, EncodeError> {
        encode(self.prefix, &self.pointer)
    }
}

pub fn decode(s: &str) -> Result<Entity, DecodeError> {
    let input = strip_uri_scheme(s);
    let checked = CheckedHrpstring::new::<Bech32>(input).map_err(|e| DecodeError::Bech32(e.to_string()))?;
    if input.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(DecodeError::NotLowercase);
    }
    let hrp = checked.hrp().to_string();
    let data: Vec<u8> = checked.byte_iter().collect();
    let prefix = Prefix::parse(&hrp).ok_or(DecodeError::UnknownPrefix(hrp))?;

    let pointer = match prefix {
        Prefix::Npub => NostrPointer::Profile(ProfilePointer {
            pubkey: hex32("pubkey", &data)?,
            relays: Vec::new(),
        }),
        Prefix::Note => NostrPointer::Event(EventPointer {
            id: hex32("id", &data)?,
            kind: None,
            author: None,
            relays: Vec::new(),
        }),
        Prefix::Nprofile | Prefix::Nevent | Prefix::Naddr => decode_tlv(prefix, &data)?,
    };

    Ok(Entity {
        prefix,
        pointer,
        bech32: input.to_string(),
    })
}

fn strip_uri_scheme(s: &str) -> &str {
    match s.get(..NOSTR_URI_SCHEME.len()) {
        Some(head) if head.eq_ignore_ascii_case(NOSTR_URI_SCHEME) => &s[NOSTR_URI_SCHEME.len()..],
        _ => s,
    }
}

fn decode_tlv(prefix: Prefix, data: &[u8]) -> Result<NostrPointer, DecodeError> {
    let mut special: Option<&[u8]> = None;
    let mut author = None;
    let mut kind = None;
    let mut relays = Vec::new();

    for record in tlv::parse(data)? {
        match record.tag {
            Tlv::SPECIAL if special.is_none() => special = Some(record.value),
            Tlv::RELAY => relays.push(
                String::from_utf8(record.value.to_vec())
                    .map_err(|_| DecodeError::InvalidUtf8("relay"))?,
            ),
            Tlv::AUTHOR if author.is_none() => author = Some(hex32("author", record.value)?),
            Tlv::KIND if kind.is_none() => kind = Some(kind_from_bytes(record.value)?),
            _ => log::trace!("skipping TLV record type {} in {}", record.tag, prefix.as_str()),
        }
    }

    let special = special.ok_or(DecodeError::MissingField("special"))?;
    let relays = dedupe_relays(relays);

    Ok(match prefix {
        Prefix::Nprofile => NostrPointer::Profile(ProfilePointer {
            pubkey: hex32("pubkey", special)?,
            relays,
        }),
        Prefix::Naddr => NostrPointer::Address(AddressPointer {
            identifier: String::from_utf8(special.to_vec())
                .map_err(|_| DecodeError::InvalidUtf8("identifier"))?,
            kind: kind.ok_or(DecodeError::MissingField("kind"))?,
            pubkey: author.ok_or(DecodeError::MissingField("author"))?,
            relays,
        }),
        _ => NostrPointer::Event(EventPointer {
            id: hex32("id", special)?,
            kind,
            author,
            relays,
        }),
    })
}

fn hex32(field: &'static str, bytes: &[u8]) -> Result<String, DecodeError> {
    if bytes.len() != 32 {
        return Err(DecodeError::InvalidLength {
            field,
            expected: 32,
            actual: bytes.len(),
        });
    }
    Ok(hex::encode(bytes))
}

fn kind_from_bytes(bytes: &[u8]) -> Result<u32, DecodeError> {
    let raw: [u8; 4] = bytes.try_into().map_err(|_| DecodeError::InvalidLength {
        field: "kind",
        expected: 4,
        actual: bytes.len(),
    })?;
    Ok(u32::from_be_bytes(raw))
}

/// Encodes `pointer` under `prefix`.
///
/// Bare prefixes refuse pointers that carry relays, a kind or an author,
/// since those would be silently lost.
pub fn encode(prefix: Prefix, pointer: &NostrPointer) -> Result<String, EncodeError> {
    let unrepresentable = || EncodeError::Unrepresentable {
        prefix: prefix.as_str(),
    };

    let data = match (prefix, pointer) {
        (Prefix::Npub, NostrPointer::Profile(p)) if p.relays.is_empty() => {
            bytes32("pubkey", &p.pubkey)?.to_vec()
        }
        (Prefix::Note, NostrPointer::Event(e))
            if e.relays.is_empty() && e.kind.is_none() && e.author.is_none() =>
        {
            bytes32("id", &e.id)?.to_vec()
        }
        (Prefix::Nprofile, NostrPointer::Profile(p)) => {
            let mut out = Vec::new();
            tlv::write(&mut out, Tlv::SPECIAL, &bytes32("pubkey", &p.pubkey)?, "pubkey")?;
            write_relays(&mut out, &p.relays)?;
            out
        }
        (Prefix::Nevent, NostrPointer::Event(e)) => {
            let mut out = Vec::new();
            tlv::write(&mut out, Tlv::SPECIAL, &bytes32("id", &e.id)?, "id")?;
            write_relays(&mut out, &e.relays)?;
            if let Some(author) = &e.author {
                tlv::write(&mut out, Tlv::AUTHOR, &bytes32("author", author)?, "author")?;
            }
            if let Some(kind) = e.kind {
                tlv::write(&mut out, Tlv::KIND, &kind.to_be_bytes(), "kind")?;
            }
            out
        }
        (Prefix::Naddr, NostrPointer::Address(a)) => {
            let mut out = Vec::new();
            tlv::write(&mut out, Tlv::SPECIAL, a.identifier.as_bytes(), "identifier")?;
            write_relays(&mut out, &a.relays)?;
            tlv::write(&mut out, Tlv::AUTHOR, &bytes32("pubkey", &a.pubkey)?, "pubkey")?;
            tlv::write(&mut out, Tlv::KIND, &a.kind.to_be_bytes(), "kind")?;
            out
        }
        _ => return Err(unrepresentable()),
    };

    let hrp = Hrp::parse(prefix.as_str()).map_err(|e| EncodeError::Bech32(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, &data).map_err(|e| EncodeError::Bech32(e.to_string()))
}

fn write_relays(out: &mut Vec<u8>, relays: &[String]) -> Result<(), EncodeError> {
    for relay in dedupe_relays(relays.iter().cloned()) {
        tlv::write(out, Tlv::RELAY, relay.as_bytes(), "relay")?;
    }
    Ok(())
}

fn bytes32(field: &'static str, value: &str) -> Result<[u8; 32], EncodeError> {
    let invalid = || EncodeError::InvalidHex {
        field,
        value: value.to_string(),
    };
    let bytes = hex::decode(value).map_err(|_| invalid())?;
    bytes.try_into().map_err(|_| invalid())
}
