use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use checksums::Md5;
use frame::{DATA_LEN, Frame, MessageType, fields};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{info, warn};
use transport::FramedConnection;

use crate::distortion::Distort;
use crate::time::wire_timestamp;

/// Serves one client's distortion session end to end (§4.4.1): receive the
/// source file, verify its checksum, distort it, stream the result back,
/// and wait for the client's own verdict before closing.
pub async fn handle<S>(
    stream: S,
    save_folder: PathBuf,
    distort: Arc<dyn Distort>,
    status_tx: mpsc::UnboundedSender<bool>,
    timeout: Duration,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut conn = FramedConnection::new(stream, timeout);

    let first = match conn.recv().await {
        Ok(frame) => frame,
        Err(err) => {
            warn!(error = %err, "client session ended before WORKER_CONNECT arrived");
            return;
        }
    };
    if first.msg_type() != MessageType::WorkerConnect {
        warn!(msg_type = ?first.msg_type(), "expected WORKER_CONNECT as the first frame");
        return;
    }

    let request = match fields::parse_worker_connect(first.payload())
        .ok()
        .and_then(|(username, filename, filesize, md5, factor)| {
            Some((
                username.to_string(),
                filename.to_string(),
                filesize.parse::<u64>().ok()?,
                md5.to_string(),
                factor.parse::<f64>().ok()?,
            ))
        }) {
        Some(request) => request,
        None => {
            if let Ok(frame) = Frame::new(MessageType::WorkerConnect, b"CON_KO", wire_timestamp())
            {
                let _ = conn.send(&frame).await;
            }
            return;
        }
    };
    let (username, filename, filesize, declared_md5, factor) = request;

    if conn
        .send(&Frame::empty(MessageType::WorkerConnect, wire_timestamp()))
        .await
        .is_err()
    {
        return;
    }

    let _ = status_tx.send(true);
    conn.mark_established();
    info!(%username, %filename, filesize, factor, "session started");

    if let Err(err) = run_session(
        &mut conn,
        &save_folder,
        &filename,
        filesize,
        &declared_md5,
        factor,
        distort.as_ref(),
    )
    .await
    {
        warn!(%username, %filename, error = %err, "session failed");
    }

    let _ = status_tx.send(false);
    info!(%username, %filename, "session ended");
}

#[derive(Debug, thiserror::Error)]
enum SessionError {
    #[error("transport error: {0}")]
    Transport(#[from] transport::TransportError),
    #[error("received file failed its declared checksum")]
    ChecksumMismatch,
    #[error("failed to persist received file: {0}")]
    Io(#[from] std::io::Error),
}

async fn run_session<S>(
    conn: &mut FramedConnection<S>,
    save_folder: &Path,
    filename: &str,
    filesize: u64,
    declared_md5: &str,
    factor: f64,
    distort: &dyn Distort,
) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let received = receive_file(conn, filesize).await?;

    let mut hasher = Md5::new();
    hasher.update(&received);
    let actual_md5 = Md5::to_hex(&hasher.finalize());

    if actual_md5 != declared_md5 {
        conn.send(&Frame::new(
            MessageType::FileInfo,
            b"CHECK_KO",
            wire_timestamp(),
        )?)
        .await?;
        return Err(SessionError::ChecksumMismatch);
    }

    persist(save_folder, filename, &received)?;

    let distorted = distort.apply(&received, factor);
    let mut result_hasher = Md5::new();
    result_hasher.update(&distorted);
    let result_md5 = Md5::to_hex(&result_hasher.finalize());

    conn.send(&Frame::new(
        MessageType::FileInfo,
        &fields::build_file_info(&distorted.len().to_string(), &result_md5),
        wire_timestamp(),
    )?)
    .await?;

    send_file(conn, &distorted).await?;
    await_verdict(conn).await;
    Ok(())
}

async fn receive_file<S>(
    conn: &mut FramedConnection<S>,
    filesize: u64,
) -> Result<Vec<u8>, SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = Vec::with_capacity(filesize as usize);
    while (buffer.len() as u64) < filesize {
        let frame = conn.recv().await?;
        if frame.msg_type() != MessageType::FileData {
            warn!(msg_type = ?frame.msg_type(), "expected FILE_DATA while receiving");
            continue;
        }
        buffer.extend_from_slice(frame.payload());
    }
    buffer.truncate(filesize as usize);
    Ok(buffer)
}

async fn send_file<S>(conn: &mut FramedConnection<S>, data: &[u8]) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    for chunk in data.chunks(DATA_LEN) {
        let frame = Frame::new(MessageType::FileData, chunk, wire_timestamp())?;
        conn.send(&frame).await?;
    }
    Ok(())
}

/// Waits for the client's `MD5_CHECK` verdict, then its `DISCONNECT`
/// (§4.4.1 steps 6-7). A client that vanishes instead of disconnecting
/// cleanly does not wedge the worker — the read deadline bounds the wait.
async fn await_verdict<S>(conn: &mut FramedConnection<S>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match conn.recv().await {
        Ok(frame) if frame.msg_type() == MessageType::Md5Check => {
            info!(verdict = %String::from_utf8_lossy(frame.payload()), "client reported transfer verdict");
        }
        Ok(other) => {
            warn!(msg_type = ?other.msg_type(), "expected MD5_CHECK from client");
        }
        Err(err) => {
            warn!(error = %err, "client vanished before sending MD5_CHECK");
            return;
        }
    }

    match conn.recv().await {
        Ok(frame) if frame.msg_type() == MessageType::Disconnect => {}
        Ok(other) => warn!(msg_type = ?other.msg_type(), "expected DISCONNECT from client"),
        Err(err) => warn!(error = %err, "client vanished before sending DISCONNECT"),
    }
}

fn persist(save_folder: &Path, filename: &str, data: &[u8]) -> std::io::Result<()> {
    let safe_name = Path::new(filename)
        .file_name()
        .unwrap_or_else(|| std::ffi::OsStr::new("unnamed"));
    std::fs::write(save_folder.join(safe_name), data)
}
