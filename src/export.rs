//! Writing a manual out as a directory tree.
//!
//! [`ExportMode::Html`] produces a browsable static site: every page becomes
//! a complete HTML document, images and sprites are copied unchanged, and
//! each `!Root` page is also written as `index.html`. The generated links
//! (`sub/page.html`, `../other/index.html`) match these file names.
//! [`ExportMode::Extract`] copies every file byte-for-byte with its filetype
//! appended, the usual way RISC OS files are kept on other systems.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stronghelp::export::{ExportOptions, export_manual};
//! use stronghelp::manual::Manual;
//!
//! let manual = Manual::open("Manuals/BASIC,3d6")?;
//! let report = export_manual(&manual, "site/basic", &ExportOptions::new())?;
//! println!("{} pages, {} images", report.files, report.raw_files);
//! # Ok::<(), stronghelp::Error>(())
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::common::{Result, encode_text};
use crate::image::EntryId;
use crate::manual::{Manual, ROOT_PAGE};
use crate::page::Page;

const INDEX_FILE: &str = "index.html";
const SOURCE_SUFFIX: &str = ".strong";

/// What [`export_manual`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    /// Rendered HTML pages plus raw images.
    #[default]
    Html,
    /// Every file unchanged, named `name,xxx`. Links are skipped.
    Extract,
}

/// Export settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    pub mode: ExportMode,
    /// Write each page's source next to its HTML as `<name>.strong`.
    pub keep_source: bool,
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_mode(mut self, mode: ExportMode) -> Self {
        self.mode = mode;
        self
    }

    #[inline]
    pub fn with_keep_source(mut self, keep: bool) -> Self {
        self.keep_source = keep;
        self
    }
}

/// Counts of what an export wrote and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub directories: usize,
    /// Pages (or, when extracting, files) written.
    pub files: usize,
    /// Images and sprites copied unchanged.
    pub raw_files: usize,
    pub skipped_links: usize,
    /// Output paths claimed by an earlier entry of the same run.
    pub collisions: Vec<PathBuf>,
    /// Files or directories that could not be written.
    pub failures: usize,
}

/// Write `manual` below `target`, creating it if needed.
///
/// Only failing to create `target` itself is an error. Problems with single
/// entries are logged, counted in the report and skipped.
pub fn export_manual(
    manual: &Manual,
    target: impl AsRef<Path>,
    options: &ExportOptions,
) -> Result<ExportReport> {
    let target = target.as_ref();
    fs::create_dir_all(target)?;
    let mut exporter = Exporter {
        manual,
        options,
        report: ExportReport::default(),
        written: HashSet::new(),
    };
    exporter.directory(manual.image().root(), target);
    let report = exporter.report;
    info!(
        "Exported manual {} to {}: {} files, {} raw, {} collisions, {} failures",
        manual.name(),
        target.display(),
        report.files,
        report.raw_files,
        report.collisions.len(),
        report.failures
    );
    Ok(report)
}

struct Exporter<'a> {
    manual: &'a Manual,
    options: &'a ExportOptions,
    report: ExportReport,
    written: HashSet<PathBuf>,
}

impl Exporter<'_> {
    fn directory(&mut self, dir: EntryId, path: &Path) {
        let tree = self.manual.image().tree();
        for &child in tree.children(dir) {
            let entry = &tree[child];
            if entry.is_directory() {
                let sub = path.join(file_name(&entry.name().to_lowercase()));
                match fs::create_dir_all(&sub) {
                    Ok(()) => {
                        self.report.directories += 1;
                        self.directory(child, &sub);
                    },
                    Err(err) => {
                        warn!("Cannot create directory {}: {}", sub.display(), err);
                        self.report.failures += 1;
                    },
                }
            } else {
                self.file(child, path);
            }
        }
    }

    fn file(&mut self, id: EntryId, dir: &Path) {
        let tree = self.manual.image().tree();
        let entry = &tree[id];
        if entry.is_link() && self.options.mode == ExportMode::Extract {
            debug!("Skipping link {}", tree.pathname(id));
            self.report.skipped_links += 1;
            return;
        }
        let Some(source) = tree.target(id) else {
            self.report.skipped_links += 1;
            return;
        };
        let load_exec = tree[source].load_exec();
        let data = self.manual.image().data(id);
        let filetype = load_exec.filetype_hex().to_lowercase();

        if self.options.mode == ExportMode::Extract {
            let path = dir.join(file_name(&format!("{},{}", entry.name(), filetype)));
            if self.write(path, &data) {
                if load_exec.is_raw_passthrough() {
                    self.report.raw_files += 1;
                } else {
                    self.report.files += 1;
                }
            }
            return;
        }

        let name = entry.name().to_lowercase();
        if load_exec.is_raw_passthrough() {
            let path = dir.join(file_name(&format!("{},{}", name, filetype)));
            if self.write(path, &data) {
                self.report.raw_files += 1;
            }
            return;
        }

        let page = Page::from_bytes(&data, self.manual).with_options(*self.manual.options());
        let document = page.to_html_document(self.manual.styles());
        let html = encode_text(&document);
        if !self.write(dir.join(file_name(&format!("{}.html", name))), &html) {
            return;
        }
        self.report.files += 1;
        if name == ROOT_PAGE.to_lowercase() {
            self.write(dir.join(INDEX_FILE), &html);
        }
        if self.options.keep_source {
            self.write(dir.join(file_name(&format!("{}{}", name, SOURCE_SUFFIX))), &data);
        }
    }

    /// Write one output file unless the path was already written this run.
    fn write(&mut self, path: PathBuf, data: &[u8]) -> bool {
        if !self.written.insert(path.clone()) {
            warn!("{} already written, skipping duplicate", path.display());
            self.report.collisions.push(path);
            return false;
        }
        match fs::write(&path, data) {
            Ok(()) => {
                debug!("Wrote {} ({} bytes)", path.display(), data.len());
                true
            },
            Err(err) => {
                warn!("Cannot write {}: {}", path.display(), err);
                self.report.failures += 1;
                false
            },
        }
    }
}

/// Entry name usable as a single path component.
fn file_name(name: &str) -> String {
    let name = name.replace(['/', '\\'], "_");
    match name.as_str() {
        "" | "." | ".." => format!("_{}", name),
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::parser::fixtures::{Node, build_image};

    const SPRITE: &[u8] = b"\x01\x00\x00\x00sprite\xff";

    fn manual() -> Manual {
        let data = build_image(&[
            Node::File("!Root", b"Guide\nSee <Page> and <Sub.Leaf>.\n"),
            Node::File("Page", b"A page\nText\n"),
            Node::File("PAGE", b"Shadow\nHidden by Page\n"),
            Node::Typed("Pic", SPRITE, 0xFF9),
            Node::Dir("Sub", vec![
                Node::File("!Root", b"Sub index\nx"),
                Node::File("Leaf", b"Leaf\ny"),
            ]),
            Node::Link("Alias>Page"),
        ]);
        Manual::from_bytes("Guide", data).unwrap()
    }

    fn read(path: PathBuf) -> String {
        String::from_utf8(fs::read(&path).unwrap()).unwrap()
    }

    #[test]
    fn test_html_export() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("guide");
        let report = export_manual(&manual(), &out, &ExportOptions::new()).unwrap();

        assert_eq!(report.directories, 1);
        assert_eq!(report.files, 5);
        assert_eq!(report.raw_files, 1);
        assert_eq!(report.skipped_links, 0);
        assert_eq!(report.failures, 0);
        assert_eq!(report.collisions, vec![out.join("page.html")]);

        let root = read(out.join("!root.html"));
        assert!(root.contains("<title>Guide</title>"));
        assert!(root.contains("<a href=\"page.html\">Page</a>"));
        assert!(root.contains("<a href=\"sub/leaf.html\">Sub.Leaf</a>"));
        assert_eq!(read(out.join("index.html")), root);

        assert!(read(out.join("page.html")).contains("<title>A page</title>"));
        assert!(read(out.join("alias.html")).contains("<title>A page</title>"));
        assert!(read(out.join("sub").join("leaf.html")).contains("y<br>"));
        assert!(out.join("sub").join("index.html").exists());
        assert_eq!(fs::read(out.join("pic,ff9")).unwrap(), SPRITE);
        assert!(!out.join("page.strong").exists());
    }

    #[test]
    fn test_keep_source() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions::new().with_keep_source(true);
        export_manual(&manual(), dir.path(), &options).unwrap();
        assert_eq!(read(dir.path().join("page.strong")), "A page\nText\n");
        assert!(!dir.path().join("pic,ff9.strong").exists());
    }

    #[test]
    fn test_html_is_latin1() {
        let data = build_image(&[Node::File("!Root", b"Caf\xe9\nna\xefve")]);
        let manual = Manual::from_bytes("Cafe", data).unwrap();
        let dir = tempfile::tempdir().unwrap();
        export_manual(&manual, dir.path(), &ExportOptions::new()).unwrap();
        let bytes = fs::read(dir.path().join("!root.html")).unwrap();
        assert!(bytes.windows(5).any(|w| w == b"Caf\xe9<"));
        assert!(bytes.windows(5).any(|w| w == b"na\xefve"));
    }

    #[test]
    fn test_extract_export() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions::new().with_mode(ExportMode::Extract);
        let report = export_manual(&manual(), dir.path(), &options).unwrap();

        assert_eq!(report.directories, 1);
        assert_eq!(report.files, 5);
        assert_eq!(report.raw_files, 1);
        assert_eq!(report.skipped_links, 1);
        assert!(report.collisions.is_empty());

        let out = dir.path();
        assert_eq!(read(out.join("Page,fff")), "A page\nText\n");
        assert_eq!(read(out.join("PAGE,fff")), "Shadow\nHidden by Page\n");
        assert_eq!(read(out.join("sub").join("Leaf,fff")), "Leaf\ny");
        assert_eq!(fs::read(out.join("Pic,ff9")).unwrap(), SPRITE);
        assert!(!out.join("Alias,fff").exists());
        assert!(!out.join("index.html").exists());
    }

    #[test]
    fn test_dangling_link_is_skipped() {
        let data = build_image(&[Node::File("!Root", b"R\nx"), Node::Link("Gone>Nowhere")]);
        let manual = Manual::from_bytes("M", data).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let report = export_manual(&manual, dir.path(), &ExportOptions::new()).unwrap();
        assert_eq!(report.files, 1);
        assert_eq!(report.skipped_links, 1);
        assert!(!dir.path().join("gone.html").exists());
    }

    #[test]
    fn test_file_name_sanitizing() {
        assert_eq!(file_name("page"), "page");
        assert_eq!(file_name("a/b"), "a_b");
        assert_eq!(file_name(".."), "_..");
        assert_eq!(file_name(""), "_");
    }
}
