//! Snapshot payload decoding orchestration (decryption + deserialization).

use log::{debug, info};

use super::codec::{self, Value};
use super::crypto;
use super::error::Result;

/// Turn an encrypted snapshot blob into a decoded record tree.
///
/// Process:
/// 1. AES-CBC decrypt with the caller-supplied key/iv
/// 2. Strip PKCS#7 padding (rejecting inconsistent padding bytes)
/// 3. Decode the MessagePack payload into a [`Value`] tree
///
/// One-shot offline operation: any failure is surfaced immediately with no
/// partial result and no retry.
pub fn decrypt_and_decode(blob: &[u8], key: &[u8], iv: &[u8]) -> Result<Value> {
    info!("Decrypting snapshot blob: {} bytes", blob.len());
    let plaintext = crypto::decrypt(blob, key, iv)?;
    let tree = codec::decode(&plaintext)?;
    debug!("Snapshot decoded into record tree");
    Ok(tree)
}

/// Inverse of [`decrypt_and_decode`]: serialize a record tree and encrypt it
/// into a snapshot blob. Used for fixtures and round-trip verification.
pub fn encode_and_encrypt(tree: &Value, key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let plaintext = codec::encode(tree)?;
    crypto::encrypt(&plaintext, key, iv)
}

/// Pretty-print a record tree as indented JSON, the debugging format the
/// `--json` CLI flag persists.
pub fn dump_pretty(tree: &Value) -> String {
    serde_json::to_string_pretty(&codec::to_json(tree))
        .unwrap_or_else(|_| String::from("<unprintable record tree>"))
}
