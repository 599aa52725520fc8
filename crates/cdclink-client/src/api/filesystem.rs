//! File transfer helpers working on local paths.
//!
//! Thin wrappers over [`crate::transfer`] that handle the local side:
//! opening, buffering and flushing files on fetch, reading the whole
//! file up front on store (the size and CRC32 must be declared at
//! init).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use cdclink_transport::Transport;

use crate::transfer::{self, ProgressFn, TransferOptions};
use crate::{ClientError, Session};

/// Fetch `remote_path` from the device into the local file at
/// `local_path`, creating or truncating it.
pub fn get_file<T: Transport>(
    session: &mut Session<T>,
    remote_path: &str,
    local_path: &Path,
    options: &TransferOptions,
    progress: Option<ProgressFn<'_>>,
) -> Result<u64, ClientError> {
    let file = File::create(local_path)?;
    let mut writer = BufWriter::new(file);
    let received = transfer::get(session, remote_path, &mut writer, options, progress)?;
    writer.flush()?;
    log::info!("file {remote_path} complete");
    Ok(received)
}

/// Store the local file at `local_path` on the device at `remote_path`.
pub fn put_file<T: Transport>(
    session: &mut Session<T>,
    local_path: &Path,
    remote_path: &str,
    progress: Option<ProgressFn<'_>>,
) -> Result<u64, ClientError> {
    let data = std::fs::read(local_path)?;
    transfer::put(session, remote_path, &data, progress)
}
