//! Unwrapping of manuals delivered inside another container.

use bytes::Bytes;
use log::debug;

use crate::common::detection::{detect_container_from_bytes, utils::HELP_SIGNATURE};
use crate::common::{Error, Result};

/// Return the bare HELP image held in `data`.
///
/// A HELP image is returned unchanged. A ZIP archive is opened and its first
/// entry, decompressed, is taken as the image. Anything else is rejected.
pub fn unwrap_container(data: Bytes) -> Result<Bytes> {
    let Some(format) = detect_container_from_bytes(&data) else {
        return Err(Error::InvalidFormat(
            "Not a StrongHelp file or a Zip file".to_string(),
        ));
    };
    if !format.is_wrapped() {
        return Ok(data);
    }
    debug!("Unwrapping {:?} container", format);
    let image = first_zip_entry(&data)?;
    if !image.starts_with(HELP_SIGNATURE) {
        return Err(Error::InvalidFormat(
            "First ZIP entry is not a StrongHelp file".to_string(),
        ));
    }
    Ok(image)
}

#[cfg(feature = "zip")]
fn first_zip_entry(data: &[u8]) -> Result<Bytes> {
    use std::io::{Cursor, Read};

    let mut archive = zip::ZipArchive::new(Cursor::new(data))?;
    if archive.is_empty() {
        return Err(Error::InvalidFormat("ZIP archive has no entries".to_string()));
    }
    let mut entry = archive.by_index(0)?;
    debug!("Reading manual from ZIP entry {}", entry.name());
    let mut buffer = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
    entry.read_to_end(&mut buffer)?;
    Ok(Bytes::from(buffer))
}

#[cfg(not(feature = "zip"))]
fn first_zip_entry(_data: &[u8]) -> Result<Bytes> {
    debug!("ZIP container found but ZIP support is disabled");
    Err(Error::FeatureDisabled("zip".to_string()))
}
