//! Custom error types for the mysekai-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The AES key has an unsupported length (16, 24 or 32 bytes required).
    #[error("Unsupported AES key length: {0} bytes. Expected 16, 24 or 32.")]
    BadKeyLength(usize),

    /// The initialization vector is not exactly one AES block.
    #[error("Bad IV length: {0} bytes. Expected 16.")]
    BadIvLength(usize),

    /// The ciphertext is not block-aligned and cannot have been produced by AES-CBC.
    #[error("Ciphertext length {0} is not a multiple of the 16-byte AES block size")]
    BadCiphertextLength(usize),

    /// PKCS#7 padding of the decrypted plaintext is malformed, usually a sign
    /// of a wrong key/iv or corrupted input.
    #[error("Malformed PKCS#7 padding in decrypted snapshot (wrong key/iv or corrupted data?)")]
    BadPadding,

    /// The decrypted payload is not a structurally valid MessagePack record tree.
    #[error("Malformed record tree: {0}")]
    MalformedRecordTree(String),

    /// The snapshot references a site with no registered map configuration,
    /// so no coordinate system exists to place its markers.
    #[error("Unknown site id: {0}. No map configuration registered for it.")]
    UnknownSite(i64),
}

/// A convenience `Result` type alias using the crate's `SnapshotError` type.
pub type Result<T> = std::result::Result<T, SnapshotError>;
