use std::path::PathBuf;

use crate::error::FeedError;

/// The anchor that receives the rendered feed.
///
/// This is the seam between the pipeline and whatever hosts the output,
/// be it an in-memory page fragment or a file on disk. Attachment is
/// re-checked at placement time rather than at widget construction,
/// since the anchor may come and go in between.
pub trait FeedTarget {
    /// Whether the anchor can currently be resolved.
    fn is_attached(&self) -> bool;

    /// Replaces the anchor's entire content with the rendered feed.
    fn place(&mut self, html: &str) -> Result<(), FeedError>;
}

/// A detachable in-memory anchor.
///
/// Stands in for a page element in tests and embedding hosts. Detaching it
/// models an element that was removed after the widget was constructed.
#[derive(Debug, Default)]
pub struct InMemoryTarget {
    html: Option<String>,
    detached: bool,
}

impl InMemoryTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// The content placed so far, if any.
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }

    /// Makes the anchor unresolvable until `attach` is called.
    pub fn detach(&mut self) {
        self.detached = true;
    }

    pub fn attach(&mut self) {
        self.detached = false;
    }
}

impl FeedTarget for InMemoryTarget {
    fn is_attached(&self) -> bool {
        !self.detached
    }

    fn place(&mut self, html: &str) -> Result<(), FeedError> {
        self.html = Some(html.to_string());
        Ok(())
    }
}

/// An anchor backed by a file, used by the command line front end.
pub struct FileTarget {
    path: PathBuf,
}

impl FileTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl FeedTarget for FileTarget {
    fn is_attached(&self) -> bool {
        // The file itself need not exist yet, but its parent directory must.
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
            _ => true,
        }
    }

    fn place(&mut self, html: &str) -> Result<(), FeedError> {
        std::fs::write(&self.path, html).map_err(|e| FeedError::Placement(e.to_string()))
    }
}
