pub mod compression;
pub mod error;
pub mod image;

use log::*;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

pub use crate::compression::block::BlockVariant;
pub use crate::error::{BlpError, DataError, FormatError, ValidationError};
pub use crate::image::format::{AlphaDepth, CompressionKind, Image};
pub use crate::image::{build, decode, describe, BuildOptions, HeaderReport, ResizeMode};

/// Sends this crate's log records at `Debug` and above to the file at `path`.
///
/// # Returns
/// `Ok(true)` when the logger was installed, `Ok(false)` when another logger
/// was already in place and keeps receiving records.
///
/// # Errors
/// Any I/O error from creating the log file.
pub fn init_logging(path: impl AsRef<Path>) -> io::Result<bool> {
    let path = path.as_ref();
    let target = Box::new(File::create(path)?);

    let installed = env_logger::Builder::new()
        .target(env_logger::Target::Pipe(target))
        .filter(Some("lib_blp"), LevelFilter::Debug)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init()
        .is_ok();
    if !installed {
        warn!("Logger already installed, {} will stay empty", path.display());
    }
    Ok(installed)
}
