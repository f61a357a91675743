use std::path::PathBuf;

use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum FrameSourceError {
    #[error("no frames found in {0}")]
    Empty(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("{path} is {actual_width}x{actual_height}, expected {width}x{height}")]
    SizeMismatch {
        path: PathBuf,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

/// Supplies frames of one fixed size, in capture order.
///
/// Implementations own the I/O details (files, cameras) while the tracking
/// pipeline only sees [`Frame`]s.
pub trait FrameSource: Send {
    /// Size of every frame this source yields.
    fn frame_size(&self) -> (u32, u32);

    /// The next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<Frame>, FrameSourceError>;
}
