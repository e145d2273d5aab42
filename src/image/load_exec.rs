//! RISC OS load/exec address pair.
//!
//! When the top twelve bits of the load word are all set, the pair does not hold
//! addresses but a 12-bit filetype and a 40-bit datestamp in centiseconds since
//! 1900-01-01.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use phf::phf_map;

/// Filetypes whose payload is an image or sprite and is never rendered as markup.
pub const RAW_PASSTHROUGH_FILETYPES: [u16; 3] = [0xAFF, 0xFF9, 0xFCA];

static FILETYPE_NAMES: phf::Map<u16, &'static str> = phf_map! {
    0x3D6u16 => "StrongHelp",
    0xAFFu16 => "DrawFile",
    0xFAFu16 => "HTML",
    0xFCAu16 => "Squash",
    0xFEBu16 => "Obey",
    0xFF9u16 => "Sprite",
    0xFFAu16 => "Module",
    0xFFBu16 => "BASIC",
    0xFFDu16 => "Data",
    0xFFEu16 => "Command",
    0xFFFu16 => "Text",
};

/// Load and exec words of a directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadExec {
    load: u32,
    exec: u32,
}

impl LoadExec {
    #[inline]
    pub const fn new(load: u32, exec: u32) -> Self {
        Self { load, exec }
    }

    #[inline]
    pub const fn load(&self) -> u32 {
        self.load
    }

    #[inline]
    pub const fn exec(&self) -> u32 {
        self.exec
    }

    /// Whether the pair encodes a filetype and datestamp instead of addresses.
    #[inline]
    pub const fn is_filetype_timestamp(&self) -> bool {
        (self.load >> 20) & 0xFFF == 0xFFF
    }

    /// 12-bit filetype code.
    #[inline]
    pub const fn filetype(&self) -> u16 {
        ((self.load & 0xFFF00) >> 8) as u16
    }

    /// Filetype as three upper-case hex digits, e.g. `FFF`.
    pub fn filetype_hex(&self) -> String {
        format!("{:03X}", self.filetype())
    }

    /// Well-known name of the filetype, if any.
    pub fn filetype_name(&self) -> Option<&'static str> {
        FILETYPE_NAMES.get(&self.filetype()).copied()
    }

    /// Raw 40-bit datestamp in centiseconds.
    #[inline]
    pub const fn datestamp(&self) -> u64 {
        (self.exec as u64) | (((self.load & 0xFF) as u64) << 32)
    }

    /// Datestamp as calendar time, or `None` for plain load/exec addresses.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        if !self.is_filetype_timestamp() {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)?.and_hms_opt(0, 0, 0)?;
        let millis = i64::try_from(self.datestamp()).ok()?.checked_mul(10)?;
        epoch.checked_add_signed(TimeDelta::try_milliseconds(millis)?)
    }

    /// Image and sprite payloads that are exported byte-for-byte.
    #[inline]
    pub fn is_raw_passthrough(&self) -> bool {
        RAW_PASSTHROUGH_FILETYPES.contains(&self.filetype())
    }
}

impl fmt::Display for LoadExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.timestamp() {
            Some(stamp) => write!(f, "{:03X}|{}", self.filetype(), stamp),
            None => write!(f, "{:08X}/{:08X}", self.load, self.exec),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_filetype_and_stamp() {
        let le = LoadExec::new(0xFFF3_D6_01, 0x0000_0064);
        assert!(le.is_filetype_timestamp());
        assert_eq!(le.filetype(), 0x3D6);
        assert_eq!(le.filetype_hex(), "3D6");
        assert_eq!(le.filetype_name(), Some("StrongHelp"));
        assert_eq!(le.datestamp(), (1u64 << 32) | 100);
    }

    #[test]
    fn test_timestamp_epoch() {
        let le = LoadExec::new(0xFFFF_FF00, 100);
        let stamp = le.timestamp().unwrap();
        assert_eq!((stamp.year(), stamp.month(), stamp.day()), (1900, 1, 1));
        assert_eq!(stamp.second(), 1);
        assert_eq!(le.to_string(), "FFF|1900-01-01 00:00:01");
    }

    #[test]
    fn test_plain_addresses() {
        let le = LoadExec::new(0x0000_8000, 0x0000_8000);
        assert!(!le.is_filetype_timestamp());
        assert_eq!(le.timestamp(), None);
        assert_eq!(le.to_string(), "00008000/00008000");
    }

    #[test]
    fn test_raw_passthrough() {
        assert!(LoadExec::new(0xFFFF_F900, 0).is_raw_passthrough());
        assert!(LoadExec::new(0xFFFA_FF00, 0).is_raw_passthrough());
        assert!(!LoadExec::new(0xFFFF_FF00, 0).is_raw_passthrough());
    }
}
