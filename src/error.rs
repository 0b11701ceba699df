use thiserror::Error;

/// Errors that abort a render.
///
/// Resource-fetch problems (unreachable images, bad logos) never show up here:
/// they degrade to "render verbatim" or "skip element" inside the renderer.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid document XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("font error: {0}")]
    Font(String),

    #[error("image error: {0}")]
    Image(String),

    #[error("malformed document tree: {0}")]
    Structure(String),

    #[error("PDF assembly failed: {0}")]
    Surface(String),
}

impl Error {
    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        Error::Structure(msg.into())
    }
}
