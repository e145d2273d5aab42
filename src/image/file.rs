use std::path::Path;

use bytes::Bytes;
use zerocopy::{FromBytes, LE, U32};
use zerocopy_derive::FromBytes as DeriveFromBytes;

use super::entry::EntryId;
use super::load_exec::LoadExec;
use super::parser::ImageParser;
use super::tree::ImageTree;
use crate::common::binary::ByteView;
use crate::common::{Error, Result};

/// Raw root header (28 bytes) at offset 0 of every image.
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
pub(crate) struct RawRootHeader {
    /// `HELP`
    magic: [u8; 4],
    /// Size of the root block
    root_block_size: U32<LE>,
    /// Format version, e.g. 275
    version: U32<LE>,
    /// Offset of the first free block, -1 when none
    first_free: U32<LE>,
    /// Offset of the root directory block
    root_directory: U32<LE>,
    /// Load word of the root directory
    load: U32<LE>,
    /// Exec word of the root directory
    exec: U32<LE>,
}

impl RawRootHeader {
    pub(crate) const SIZE: usize = 28;
}

/// Decoded root header of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub root_block_size: u32,
    pub version: u32,
    /// Offset of the first free block; negative when the image has none.
    pub first_free_block: i32,
    pub root_directory_offset: usize,
    pub load_exec: LoadExec,
}

impl ImageHeader {
    /// Decode and validate the header at the start of `view`.
    pub fn read(view: &ByteView) -> Result<Self> {
        let raw = RawRootHeader::read_from_bytes(view.bytes_at(0, RawRootHeader::SIZE)?)
            .map_err(|_| Error::InvalidFormat("Truncated root header".to_string()))?;
        if &raw.magic != b"HELP" {
            return Err(Error::InvalidFormat("Missing HELP signature".to_string()));
        }
        Ok(Self {
            root_block_size: raw.root_block_size.get(),
            version: raw.version.get(),
            first_free_block: raw.first_free.get() as i32,
            root_directory_offset: raw.root_directory.get() as usize,
            load_exec: LoadExec::new(raw.load.get(), raw.exec.get()),
        })
    }
}

/// A parsed StrongHelp image: header, directory tree and the buffer payloads
/// are sliced from.
///
/// The image is immutable once parsed and can be shared between threads.
#[derive(Debug, Clone)]
pub struct HelpImage {
    pub(crate) header: ImageHeader,
    pub(crate) tree: ImageTree,
    pub(crate) view: ByteView,
}

impl HelpImage {
    /// Parse an image (or a ZIP holding one) with the default configuration.
    pub fn from_bytes(data: impl Into<Bytes>) -> Result<Self> {
        ImageParser::default().parse(data)
    }

    /// Read and parse an image file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    #[inline]
    pub fn header(&self) -> &ImageHeader {
        &self.header
    }

    #[inline]
    pub fn tree(&self) -> &ImageTree {
        &self.tree
    }

    /// The (unwrapped) image buffer.
    #[inline]
    pub fn view(&self) -> &ByteView {
        &self.view
    }

    #[inline]
    pub fn root(&self) -> EntryId {
        self.tree.root()
    }

    /// Look up `name` from the root, see [`ImageTree::entry`].
    pub fn entry(&self, name: &str) -> Option<EntryId> {
        self.tree.entry(self.tree.root(), name)
    }

    /// Payload of a file or link; empty for anything unreadable.
    pub fn data(&self, id: EntryId) -> Bytes {
        self.tree.file_data(id, &self.view)
    }
}
