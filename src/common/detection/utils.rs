//! Signature constants for container detection.

/// Magic bytes at offset 0 of every StrongHelp image.
pub const HELP_SIGNATURE: &[u8; 4] = b"HELP";

/// ZIP local-file-header signature, `PK\x03\x04`.
pub const ZIP_SIGNATURE: &[u8; 4] = &[0x50, 0x4B, 0x03, 0x04];
