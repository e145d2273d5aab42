//! Core container detection functions.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::types::ContainerFormat;
use super::utils::{HELP_SIGNATURE, ZIP_SIGNATURE};

/// Detect the container format of a file, reading only its first bytes.
///
/// Returns `None` if the file cannot be read or is not recognized.
pub fn detect_container<P: AsRef<Path>>(path: P) -> Option<ContainerFormat> {
    let mut header = [0u8; 4];
    let mut file = File::open(path).ok()?;
    let read = file.read(&mut header).ok()?;
    detect_container_from_bytes(&header[..read])
}

/// Detect the container format of an in-memory buffer.
///
/// # Examples
///
/// ```
/// use stronghelp::common::detection::{ContainerFormat, detect_container_from_bytes};
///
/// assert_eq!(detect_container_from_bytes(b"HELP\0\0\0\0"), Some(ContainerFormat::HelpImage));
/// assert_eq!(detect_container_from_bytes(b"PK\x03\x04"), Some(ContainerFormat::Zip));
/// assert_eq!(detect_container_from_bytes(b"PKxx"), None);
/// assert_eq!(detect_container_from_bytes(b"GIF8"), None);
/// ```
pub fn detect_container_from_bytes(bytes: &[u8]) -> Option<ContainerFormat> {
    if bytes.starts_with(HELP_SIGNATURE) {
        Some(ContainerFormat::HelpImage)
    } else if bytes.starts_with(ZIP_SIGNATURE) {
        Some(ContainerFormat::Zip)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_short_buffers() {
        assert_eq!(detect_container_from_bytes(b""), None);
        assert_eq!(detect_container_from_bytes(b"HEL"), None);
        assert_eq!(detect_container_from_bytes(b"PK"), None);
        assert_eq!(detect_container_from_bytes(b"PK\x05\x06"), None);
        assert_eq!(detect_container_from_bytes(b"PK\x03\x04\x14"), Some(ContainerFormat::Zip));
    }

    #[test]
    fn test_detect_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"HELP\x10\x00\x00\x00").unwrap();
        assert_eq!(detect_container(file.path()), Some(ContainerFormat::HelpImage));
        assert!(!ContainerFormat::HelpImage.is_wrapped());
        assert!(ContainerFormat::Zip.is_wrapped());
    }
}
