//! Chunked file transfer over the filesystem endpoint.
//!
//! Bulk content moves in bounded chunks layered on the transaction
//! engine. Both directions open with an init transaction that fixes the
//! session id and chunk size, then move one chunk per transaction in
//! strict index order starting at 1. There is no windowing: no chunk is
//! sent before the previous chunk's reply arrives.
//!
//! Integrity is verified with CRC32. A fetch folds every decoded chunk
//! into a running checksum and compares it with the device-reported
//! value after the last chunk; a store computes size and checksum up
//! front and declares both at init, and the device detects completion
//! once the declared byte count has arrived; there is no finalize
//! call.
//!
//! A failure mid-loop aborts the whole transfer. There is no
//! checkpointing of the chunk index, so no partial-state resume.

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use cdclink_protocol::{Endpoint, Method};
use cdclink_transport::Transport;

use crate::reply::parse_body;
use crate::{ClientError, Session};

/// Progress callback: `(bytes_transferred_so_far, total_bytes)` after
/// each chunk. Observability only; correctness never depends on it.
pub type ProgressFn<'a> = &'a mut dyn FnMut(u64, u64);

/// Knobs for a fetch.
#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Fail with [`ClientError::IntegrityMismatch`] when the
    /// device-reported CRC32 disagrees with the computed one. Disabling
    /// downgrades the mismatch to a logged warning.
    pub verify_crc: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        TransferOptions { verify_crc: true }
    }
}

#[derive(Debug, Deserialize)]
struct GetInitReply {
    #[serde(rename = "rxID")]
    rx_id: u64,
    #[serde(rename = "chunkSize")]
    chunk_size: u64,
    #[serde(rename = "fileSize")]
    file_size: u64,
    #[serde(rename = "fileCrc32", default)]
    file_crc32: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GetChunkReply {
    data: String,
    #[serde(rename = "fileCrc32", default)]
    file_crc32: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PutInitReply {
    #[serde(rename = "txID")]
    tx_id: u64,
    #[serde(rename = "chunkSize")]
    chunk_size: u64,
}

/// Fetch `remote_path` from the device into `out`.
///
/// Returns the number of bytes written, which on success equals the
/// file size the device declared at init.
pub fn get<T: Transport, W: Write>(
    session: &mut Session<T>,
    remote_path: &str,
    out: &mut W,
    options: &TransferOptions,
    mut progress: Option<ProgressFn<'_>>,
) -> Result<u64, ClientError> {
    let init_reply = session.execute(
        Endpoint::Filesystem,
        Method::Get,
        json!({"fileName": remote_path}),
    )?;
    let init: GetInitReply = parse_body(&init_reply)?;
    if init.chunk_size == 0 {
        return Err(ClientError::InvalidTransfer(
            "device reported zero chunk size".to_string(),
        ));
    }
    let total_chunks = init.file_size.div_ceil(init.chunk_size);
    log::info!(
        "fetching {remote_path}: {} bytes in {total_chunks} chunks",
        init.file_size
    );

    let mut hasher = crc32fast::Hasher::new();
    let mut received: u64 = 0;
    let mut device_crc = init.file_crc32;
    for chunk_no in 1..=total_chunks {
        let reply = session.execute(
            Endpoint::Filesystem,
            Method::Get,
            json!({"rxID": init.rx_id, "chunkNo": chunk_no}),
        )?;
        let chunk: GetChunkReply = parse_body(&reply)?;
        let data = decode_chunk(&chunk.data)?;
        out.write_all(&data)?;
        hasher.update(&data);
        received += data.len() as u64;
        if chunk.file_crc32.is_some() {
            device_crc = chunk.file_crc32;
        }
        if let Some(report) = progress.as_mut() {
            report(received.min(init.file_size), init.file_size);
        }
    }

    if received != init.file_size {
        return Err(ClientError::SizeMismatch {
            expected: init.file_size,
            actual: received,
        });
    }
    let computed = format!("{:08x}", hasher.finalize());
    if let Some(expected) = device_crc {
        if !expected.eq_ignore_ascii_case(&computed) {
            if options.verify_crc {
                return Err(ClientError::IntegrityMismatch {
                    expected,
                    actual: computed,
                });
            }
            log::warn!("crc32 mismatch on {remote_path}: device {expected}, computed {computed}");
        } else {
            log::debug!("crc32 verified: {computed}");
        }
    }
    Ok(received)
}

/// Store `data` on the device at `remote_path`.
///
/// Size and CRC32 are computed up front and declared at init; the
/// device verifies completion against them.
pub fn put<T: Transport>(
    session: &mut Session<T>,
    remote_path: &str,
    data: &[u8],
    mut progress: Option<ProgressFn<'_>>,
) -> Result<u64, ClientError> {
    let crc = format!("{:08x}", crc32fast::hash(data));
    let init_reply = session.execute(
        Endpoint::Filesystem,
        Method::Put,
        json!({
            "fileName": remote_path,
            "fileSize": data.len() as u64,
            "fileCrc32": crc,
        }),
    )?;
    let init: PutInitReply = parse_body(&init_reply)?;
    log::info!("storing {} bytes at {remote_path}", data.len());

    let mut sent: u64 = 0;
    if !data.is_empty() {
        if init.chunk_size == 0 {
            return Err(ClientError::InvalidTransfer(
                "device reported zero chunk size".to_string(),
            ));
        }
        for (index, slice) in data.chunks(init.chunk_size as usize).enumerate() {
            let chunk_no = index as u64 + 1;
            session.execute(
                Endpoint::Filesystem,
                Method::Put,
                json!({
                    "txID": init.tx_id,
                    "chunkNo": chunk_no,
                    "data": BASE64.encode(slice),
                }),
            )?;
            sent += slice.len() as u64;
            if let Some(report) = progress.as_mut() {
                report(sent, data.len() as u64);
            }
        }
    }
    Ok(sent)
}

/// Decode one chunk payload. The device appends a single sentinel byte
/// after the base64 text; it is stripped before decoding.
fn decode_chunk(data: &str) -> Result<Vec<u8>, ClientError> {
    let bytes = data.as_bytes();
    let trimmed = &bytes[..bytes.len().saturating_sub(1)];
    Ok(BASE64.decode(trimmed)?)
}
