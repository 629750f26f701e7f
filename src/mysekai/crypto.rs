//! Cryptographic operations for the snapshot container format.
//!
//! Snapshots are encrypted with AES in CBC mode and padded with PKCS#7.
//! The key and iv come from the caller's configuration; nothing is derived
//! or cached here.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use log::{debug, trace};

use super::error::{Result, SnapshotError};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;
type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

const BLOCK_SIZE: usize = 16;

/// Decrypt an AES-CBC/PKCS#7 snapshot payload.
///
/// The AES variant is selected from the key length (16/24/32 bytes).
///
/// # Errors
/// - [`SnapshotError::BadKeyLength`] / [`SnapshotError::BadIvLength`] for
///   unusable key material
/// - [`SnapshotError::BadCiphertextLength`] when the input is not block-aligned
/// - [`SnapshotError::BadPadding`] when the trailing padding bytes are
///   inconsistent (every padding byte must equal the pad length)
pub fn decrypt(ciphertext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_iv(iv)?;
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(SnapshotError::BadCiphertextLength(ciphertext.len()));
    }
    trace!("Decrypting {} bytes with AES-{}-CBC", ciphertext.len(), key.len() * 8);

    let plaintext = match key.len() {
        16 => cipher::<Aes128CbcDec>(key, iv)?.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        24 => cipher::<Aes192CbcDec>(key, iv)?.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        32 => cipher::<Aes256CbcDec>(key, iv)?.decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        n => return Err(SnapshotError::BadKeyLength(n)),
    }
    .map_err(|_| SnapshotError::BadPadding)?;

    debug!("Decrypted snapshot: {} plaintext bytes", plaintext.len());
    Ok(plaintext)
}

/// Encrypt a payload as an AES-CBC/PKCS#7 snapshot.
///
/// Inverse of [`decrypt`]; used to produce snapshot fixtures and to verify
/// the round-trip property.
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    check_iv(iv)?;
    trace!("Encrypting {} bytes with AES-{}-CBC", plaintext.len(), key.len() * 8);

    let ciphertext = match key.len() {
        16 => cipher::<Aes128CbcEnc>(key, iv)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        24 => cipher::<Aes192CbcEnc>(key, iv)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        32 => cipher::<Aes256CbcEnc>(key, iv)?.encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        n => return Err(SnapshotError::BadKeyLength(n)),
    };
    Ok(ciphertext)
}

/// Build a keyed cipher instance from raw slices.
fn cipher<C: KeyIvInit>(key: &[u8], iv: &[u8]) -> Result<C> {
    C::new_from_slices(key, iv).map_err(|_| SnapshotError::BadKeyLength(key.len()))
}

fn check_iv(iv: &[u8]) -> Result<()> {
    if iv.len() != BLOCK_SIZE {
        return Err(SnapshotError::BadIvLength(iv.len()));
    }
    Ok(())
}
