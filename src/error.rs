use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OverflowKind {
    #[error("probe chain exceeded 100 slots")]
    ProbeChain,
    #[error("suggestion buffer is full")]
    SuggestionBuffer,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no such dictionary file: {path:?}")]
    NoSuchFile { path: PathBuf },

    #[error("out of memory allocating engine tables")]
    OutOfMemory,

    #[error("could not open scratch file for accepted words")]
    FileOpen,

    #[error("table overflow: {0}")]
    TableOverflow(#[from] OverflowKind),

    #[error("too many dictionary files assimilated (limit is 6 supplemental)")]
    TooManyDictionaries,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<crate::reduced_index::TableOverflow> for EngineError {
    fn from(_: crate::reduced_index::TableOverflow) -> Self {
        EngineError::TableOverflow(OverflowKind::ProbeChain)
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
