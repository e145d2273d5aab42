//! Container format type enumeration.

/// Containers a manual can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// Bare StrongHelp image starting with `HELP`
    HelpImage,
    /// ZIP archive whose first entry is the image
    Zip,
}

impl ContainerFormat {
    /// Whether the buffer has to be unwrapped before parsing.
    #[inline]
    pub fn is_wrapped(self) -> bool {
        matches!(self, ContainerFormat::Zip)
    }
}
