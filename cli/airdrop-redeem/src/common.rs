use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use alloy_primitives::{Address, B256};
use serde::Serializer;

use crate::error::{Error, Result};

fn strip_hex_prefix(s: &str) -> &str {
    let trimmed = s.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Parses an Ethereum address from a hex string.
///
/// Input is case-insensitive; no checksum is enforced here.
///
/// # Arguments
/// * `addr_str` - The address string, with or without "0x" prefix
///
/// # Errors
/// Returns `Error::InvalidAddress` if the address is not 40 hex characters,
/// contains invalid hex, or is the zero address
pub fn parse_address(addr_str: &str) -> Result<Address> {
    let cleaned = strip_hex_prefix(addr_str);
    if cleaned.len() != 40 {
        return Err(Error::InvalidAddress(format!(
            "expected 40 hex chars, got {}",
            cleaned.len()
        )));
    }
    let mut address = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut address)
        .map_err(|e| Error::InvalidAddress(format!("invalid hex encoding: {}", e)))?;
    if address == [0u8; 20] {
        return Err(Error::InvalidAddress("zero address not allowed".into()));
    }
    Ok(Address::from(address))
}

/// Parses an address and, when it is written in mixed case, checks that the
/// casing is a valid EIP-55 checksum.
///
/// All-lowercase and all-uppercase input carries no checksum and is accepted.
pub fn parse_checksummed_address(addr_str: &str) -> Result<Address> {
    let address = parse_address(addr_str)?;
    let cleaned = strip_hex_prefix(addr_str);
    let has_upper = cleaned.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = cleaned.chars().any(|c| c.is_ascii_lowercase());
    if has_upper && has_lower {
        let expected = address.to_checksum(None);
        if expected[2..] != *cleaned {
            return Err(Error::InvalidAddress(format!(
                "checksum mismatch: expected {}",
                expected
            )));
        }
    }
    Ok(address)
}

/// Parses a 32-byte hash from a hex string.
///
/// # Errors
/// Returns `Error::Malformed` naming `field` if the value is not exactly
/// 64 hex characters
pub fn parse_hash(hash_str: &str, field: &str) -> Result<B256> {
    let cleaned = strip_hex_prefix(hash_str);
    if cleaned.len() != 64 {
        return Err(Error::Malformed(format!(
            "{}: expected 64 hex chars, got {}",
            field,
            cleaned.len()
        )));
    }
    let mut hash = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut hash)
        .map_err(|e| Error::Malformed(format!("{}: invalid hex encoding: {}", field, e)))?;
    Ok(B256::from(hash))
}

/// Encodes bytes as a lowercase `0x`-prefixed hex string.
pub fn hex_encode(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Serializes an address in its EIP-55 checksummed form.
pub fn serialize_checksummed<S: Serializer>(
    address: &Address,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&address.to_checksum(None))
}

/// Sibling of `path` with a pid-qualified suffix appended to the full file
/// name, so it never equals `path` and concurrent writers do not share it.
fn temp_path_for(path: &Path) -> Result<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{:?} does not name a file", path),
            )
        })?
        .to_os_string();
    name.push(format!(".{}.tmp", std::process::id()));
    Ok(path.with_file_name(name))
}

/// Writes `contents` to a sibling temp file and renames it over `path`, so
/// readers never observe a half-written file.
pub fn write_file_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp_path = temp_path_for(path)?;
    let mut file = File::create(&temp_path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
