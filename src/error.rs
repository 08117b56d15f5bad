use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading the line-oriented mesh text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjError {
    #[error("face on line {line} has {found} index tokens; only triangles are supported")]
    FaceArity { line: usize, found: usize },
    #[error("face on line {line} has an invalid vertex index `{token}`")]
    InvalidFaceIndex { line: usize, token: String },
}

/// Errors raised while expanding indexed attributes into flat streams.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("index {index} at position {position} is out of range for {len} attributes")]
    IndexOutOfRange {
        position: usize,
        index: u32,
        len: usize,
    },
    #[error("face {face} is degenerate; its corners are collinear")]
    DegenerateFace { face: usize },
    #[error("flattened stream of {len} positions does not divide into triangles")]
    IncompleteFace { len: usize },
}

/// Failure to obtain the texture image for the textured demo.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("unable to read image {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to fetch image {path}: {message}")]
    Fetch { path: PathBuf, message: String },
    #[error("unable to decode image {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("image loader for {path} went away before delivering a result")]
    Disconnected { path: PathBuf },
}
