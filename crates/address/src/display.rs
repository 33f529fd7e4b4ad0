//! Per-chain display encodings.
//!
//! These helpers are pure byte/string transforms; [`crate::AddressFormat`]
//! picks one per chain type and supplies registry data where a native
//! address needs a script.

use bech32::{Bech32m, Hrp};
use sha2::{Digest, Sha256};
use sha3::Keccak256;

use dotbit_types::{HashType, Script, H256};

/// Full-format CKB address payload marker.
const FULL_FORMAT: u8 = 0x00;
/// Deprecated short-format marker (code hash index + args).
const SHORT_FORMAT: u8 = 0x01;

// ──────────────────────────────────────────────
// EVM
// ──────────────────────────────────────────────

/// EIP-55 mixed-case checksum encoding of a 20-byte address.
pub fn eip55(payload: &[u8]) -> String {
    let lower = hex::encode(payload);
    let hash = Keccak256::digest(lower.as_bytes());
    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a `0x` EVM address. All-lowercase and all-uppercase input is
/// accepted as is; mixed case must carry a valid EIP-55 checksum.
pub fn parse_evm(value: &str) -> Result<Vec<u8>, String> {
    let body = value
        .strip_prefix("0x")
        .ok_or_else(|| "missing 0x prefix".to_string())?;
    if body.len() != 40 {
        return Err(format!("expected 40 hex digits, got {}", body.len()));
    }
    let payload = hex::decode(body).map_err(|e| e.to_string())?;
    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && eip55(&payload) != value {
        return Err("EIP-55 checksum mismatch".to_string());
    }
    Ok(payload)
}

// ──────────────────────────────────────────────
// Base58check (Tron, Dogecoin, Bitcoin P2PKH)
// ──────────────────────────────────────────────

fn checksum(data: &[u8]) -> [u8; 4] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    [second[0], second[1], second[2], second[3]]
}

pub fn base58check_encode(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + 4);
    data.push(version);
    data.extend_from_slice(payload);
    let sum = checksum(&data);
    data.extend_from_slice(&sum);
    bs58::encode(data).into_string()
}

/// Decode a base58check string, verify checksum and version, and return the
/// payload after the version byte.
pub fn base58check_decode(value: &str, version: u8) -> Result<Vec<u8>, String> {
    let data = bs58::decode(value).into_vec().map_err(|e| e.to_string())?;
    if data.len() < 5 {
        return Err("too short for base58check".to_string());
    }
    let (body, sum) = data.split_at(data.len() - 4);
    if checksum(body).as_slice() != sum {
        return Err("base58 checksum mismatch".to_string());
    }
    if body[0] != version {
        return Err(format!(
            "version byte 0x{:02x}, expected 0x{:02x}",
            body[0], version
        ));
    }
    Ok(body[1..].to_vec())
}

// ──────────────────────────────────────────────
// CKB full addresses
// ──────────────────────────────────────────────

/// A parsed CKB address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCkbAddress {
    Full { hrp: String, script: Script },
    /// Short format: a code hash index into the well-known locks.
    Short {
        hrp: String,
        code_hash_index: u8,
        args: Vec<u8>,
    },
}

/// Full-format (bech32m) address of `script`.
pub fn full_address(hrp: &str, script: &Script) -> Result<String, String> {
    let hrp = Hrp::parse(hrp).map_err(|e| e.to_string())?;
    let mut payload = Vec::with_capacity(34 + script.args.len());
    payload.push(FULL_FORMAT);
    payload.extend_from_slice(script.code_hash.as_bytes());
    payload.push(script.hash_type.as_byte());
    payload.extend_from_slice(&script.args);
    bech32::encode::<Bech32m>(hrp, &payload).map_err(|e| e.to_string())
}

pub fn parse_ckb_address(value: &str) -> Result<ParsedCkbAddress, String> {
    let (hrp, payload) = bech32::decode(value).map_err(|e| e.to_string())?;
    let hrp = hrp.as_str().to_string();
    match payload.split_first() {
        Some((&FULL_FORMAT, rest)) => {
            if rest.len() < 33 {
                return Err("full address payload too short".to_string());
            }
            let code_hash = H256::from_slice(&rest[..32]).map_err(|e| e.to_string())?;
            let hash_type = HashType::from_byte(rest[32]).map_err(|e| e.to_string())?;
            Ok(ParsedCkbAddress::Full {
                hrp,
                script: Script::new(code_hash, hash_type, rest[33..].to_vec()),
            })
        }
        Some((&SHORT_FORMAT, rest)) => {
            let (&code_hash_index, args) = rest
                .split_first()
                .ok_or_else(|| "short address payload too short".to_string())?;
            Ok(ParsedCkbAddress::Short {
                hrp,
                code_hash_index,
                args: args.to_vec(),
            })
        }
        Some((other, _)) => Err(format!("unsupported address format 0x{:02x}", other)),
        None => Err("empty address payload".to_string()),
    }
}
