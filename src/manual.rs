//! Manuals and the library of loaded manuals.
//!
//! A [`Manual`] is a parsed image plus its style layers. It serves pages by
//! name and implements [`PageProvider`], so pages can include other pages of
//! the same manual. Links into other manuals go through a [`ManualLibrary`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use stronghelp::manual::ManualLibrary;
//!
//! let library = ManualLibrary::new();
//! let basic = library.load("Manuals/BASIC,3d6")?;
//! if let Some(page) = basic.root_page() {
//!     println!("{}", page.title());
//! }
//! let target = library.resolve(&basic, "../os/os_byte.html")?;
//! println!("{} in {}", target.name, target.manual.name());
//! # Ok::<(), stronghelp::Error>(())
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use log::{debug, info};
use parking_lot::Mutex;

use crate::common::{Error, Result, decode_text};
use crate::image::{EntryId, HelpImage};
use crate::markup::{PageRef, RenderOptions, resolve_href, to_file_link};
use crate::page::{Page, PageProvider};
use crate::style::{FontConfig, StyleContext};

/// Page shown when a manual is opened.
pub const ROOT_PAGE: &str = "!Root";

/// File holding the manual's font and style definitions.
pub const CONFIGURE_FILE: &str = "!Configure";

/// Manual name from a file name: everything before a `,xxx` filetype suffix.
pub fn manual_name(file_name: &str) -> &str {
    match file_name.find(',') {
        Some(index) if index > 0 => &file_name[..index],
        _ => file_name,
    }
}

/// One StrongHelp manual.
#[derive(Debug)]
pub struct Manual {
    name: String,
    path: Option<PathBuf>,
    image: HelpImage,
    styles: StyleContext,
    options: RenderOptions,
}

impl Manual {
    /// Load a manual from an image file (or a ZIP holding one).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let image = HelpImage::open(path)?;
        let mut manual = Self::from_image(manual_name(&file_name), image);
        manual.path = Some(path.to_path_buf());
        Ok(manual)
    }

    pub fn from_bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Result<Self> {
        Ok(Self::from_image(name, HelpImage::from_bytes(data)?))
    }

    /// Wrap a parsed image; `!Configure` becomes the manual style layer.
    pub fn from_image(name: impl Into<String>, image: HelpImage) -> Self {
        let name = name.into();
        let configure = image
            .tree()
            .children(image.root())
            .iter()
            .copied()
            .find(|&id| {
                let entry = &image.tree()[id];
                entry.is_file() && entry.name().eq_ignore_ascii_case(CONFIGURE_FILE)
            });
        let manual_styles = match configure {
            Some(id) => {
                debug!("Reading style configuration of manual {}", name);
                FontConfig::from_bytes(&image.data(id))
            },
            None => FontConfig::new(),
        };
        Self {
            name,
            path: None,
            image,
            styles: StyleContext::new().with_manual(manual_styles),
            options: RenderOptions::default(),
        }
    }

    #[inline]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the system-wide style layer.
    #[inline]
    pub fn with_system_styles(mut self, config: FontConfig) -> Self {
        self.styles = self.styles.with_system(config);
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File the manual was loaded from, if any.
    #[inline]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    pub fn image(&self) -> &HelpImage {
        &self.image
    }

    #[inline]
    pub fn styles(&self) -> &StyleContext {
        &self.styles
    }

    #[inline]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Entry holding the text of page `name`.
    ///
    /// Names are matched case-insensitively anywhere in the manual, also
    /// with their `.` separators removed. A directory stands for its `!Root`.
    pub fn page_entry(&self, name: &str) -> Option<EntryId> {
        let tree = self.image.tree();
        let found = self.image.entry(name).or_else(|| {
            let joined = name.replace('.', "");
            (joined != name).then(|| self.image.entry(&joined)).flatten()
        });
        let Some(id) = found else {
            debug!("Page {} not found in manual {}", name, self.name);
            return None;
        };
        if tree[id].is_directory() {
            return tree.entry(id, ROOT_PAGE).filter(|&root| !tree[root].is_directory());
        }
        Some(id)
    }

    /// The manual's start page.
    pub fn root_page(&self) -> Option<Page<'_>> {
        self.page(ROOT_PAGE)
    }

    /// Whether `name` resolves to a page.
    pub fn has_page(&self, name: &str) -> bool {
        self.page_entry(name).is_some()
    }
}

impl PageProvider for Manual {
    fn raw_page(&self, name: &str) -> Option<String> {
        self.page_entry(name).map(|id| decode_text(&self.image.data(id)))
    }

    fn page(&self, name: &str) -> Option<Page<'_>> {
        self.raw_page(name)
            .map(|text| Page::new(text, self).with_options(self.options))
    }
}

/// A page located by [`ManualLibrary::resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedPage {
    pub manual: Arc<Manual>,
    pub name: String,
}

impl ResolvedPage {
    pub fn page(&self) -> Option<Page<'_>> {
        self.manual.page(&self.name)
    }
}

#[derive(Debug, Default)]
struct LibraryState {
    by_path: HashMap<PathBuf, Arc<Manual>>,
    by_name: HashMap<String, Arc<Manual>>,
}

impl LibraryState {
    fn insert(&mut self, key: Option<PathBuf>, manual: &Arc<Manual>) {
        if let Some(key) = key {
            self.by_path.insert(key, Arc::clone(manual));
        }
        self.by_name
            .insert(manual.name().to_lowercase(), Arc::clone(manual));
    }
}

/// Cache key of a manual file: its canonical path when it can be resolved.
fn path_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Shared cache of loaded manuals, keyed by file and by manual name.
///
/// Each file is parsed at most once; manuals are immutable afterwards and
/// handed out as `Arc`s.
#[derive(Debug, Default)]
pub struct ManualLibrary {
    state: Mutex<LibraryState>,
}

impl ManualLibrary {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manual, reusing an earlier load of the same file.
    ///
    /// The file is read and parsed without holding the lock. When two threads
    /// load the same file at once, the first one stored is kept and returned
    /// to both.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Arc<Manual>> {
        let path = path.as_ref();
        let key = path_key(path);
        if let Some(manual) = self.state.lock().by_path.get(&key) {
            return Ok(Arc::clone(manual));
        }
        let manual = Arc::new(Manual::open(path)?);
        let mut state = self.state.lock();
        if let Some(existing) = state.by_path.get(&key) {
            debug!("Manual {} was loaded concurrently", existing.name());
            return Ok(Arc::clone(existing));
        }
        info!("Loaded manual {} from {}", manual.name(), path.display());
        state.insert(Some(key), &manual);
        Ok(manual)
    }

    /// Add a manual that was not loaded through [`ManualLibrary::load`].
    pub fn register(&self, manual: Manual) -> Arc<Manual> {
        let manual = Arc::new(manual);
        let key = manual.path().map(path_key);
        self.state.lock().insert(key, &manual);
        manual
    }

    /// Manual by name, case-insensitively.
    pub fn get(&self, name: &str) -> Option<Arc<Manual>> {
        self.state.lock().by_name.get(&name.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Follow a generated link from a page of `from`.
    ///
    /// A link into a manual that is not in the library leads to `from`'s own
    /// `notfound_<manual>` page when there is one.
    pub fn resolve(&self, from: &Arc<Manual>, href: &str) -> Result<ResolvedPage> {
        match resolve_href(href) {
            PageRef::Local(name) => local_page(from, name),
            PageRef::Foreign { manual, page } => {
                let page = if page.is_empty() { ROOT_PAGE.to_string() } else { page };
                match self.get(&manual) {
                    Some(target) => local_page(&target, page),
                    None => {
                        let fallback = format!("notfound_{}", manual);
                        if from.has_page(&fallback) {
                            debug!("Manual {} not installed, showing {}", manual, fallback);
                            local_page(from, fallback)
                        } else {
                            Err(Error::NotFound(format!("manual {} is not installed", manual)))
                        }
                    },
                }
            },
            PageRef::Anchor(anchor) => Err(Error::Unsupported(format!(
                "anchor #{} does not name a page",
                anchor
            ))),
            PageRef::External(url) => Err(Error::Unsupported(format!("external link {}", url))),
        }
    }

    /// Resolve a page name such as `Page`, `Sub.Page` or `Manual:Page`.
    pub fn resolve_name(&self, from: &Arc<Manual>, name: &str) -> Result<ResolvedPage> {
        self.resolve(from, &to_file_link(name))
    }
}

fn local_page(manual: &Arc<Manual>, name: String) -> Result<ResolvedPage> {
    if manual.has_page(&name) {
        Ok(ResolvedPage {
            manual: Arc::clone(manual),
            name,
        })
    } else {
        Err(Error::NotFound(format!("page {} in manual {}", name, manual.name())))
    }
}
