use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EscapeError>;

#[derive(Debug, Error)]
pub enum EscapeError {
    #[error("UTF-16LE input has an odd length of {len} bytes")]
    OddLength { len: usize },

    #[error("failed to write escaped output")]
    Io(#[from] io::Error),
}
