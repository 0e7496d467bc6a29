//! Tee a child's merged output into a log file, a live display and a window.
//!
//! The child writes stdout and stderr into one OS pipe, so lines keep the
//! order the child wrote them. A single [`pump`] drains that pipe into a
//! channel and a single [`StreamTee`] consumes the channel, so it is the only
//! writer to both the log file and the [`LogWindow`]. The window is handed
//! back when the stream ends, which is what lets the caller read it safely.

use crate::window::LogWindow;
use std::io::PipeReader;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader, BufWriter};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

const CHANNEL_CAPACITY: usize = 1024;

/// Callback invoked for every line, in arrival order, before it is logged.
pub type LineSink = Box<dyn FnMut(&str) + Send>;

/// Strip the line terminator (and a trailing `\r`) and decode lossily.
fn decode_line(buf: &mut Vec<u8>) -> String {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8_lossy(buf).into_owned()
}

/// Spawn a task that forwards newline-delimited lines from `reader` into `tx`.
///
/// Invalid UTF-8 is replaced rather than rejected, and a trailing `\r` is
/// stripped. A read error ends the task quietly: the exit code of the child
/// decides success, not the health of its pipe.
pub fn pump<R>(reader: R, tx: mpsc::Sender<String>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(decode_line(&mut buf)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "stopped reading child output");
                    break;
                }
            }
        }
    })
}

/// Blocking counterpart of [`pump`] for platforms without async pipes.
#[cfg(not(unix))]
fn pump_blocking(reader: PipeReader, tx: mpsc::Sender<String>) -> JoinHandle<()> {
    use std::io::BufRead;

    tokio::task::spawn_blocking(move || {
        let mut reader = std::io::BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.blocking_send(decode_line(&mut buf)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "stopped reading child output");
                    break;
                }
            }
        }
    })
}

/// Start draining the read end of a child's output pipe.
///
/// The channel closes once every write end, in the child and in this
/// process, has been dropped. Must be called inside a tokio runtime.
pub fn pipe_lines(reader: PipeReader) -> std::io::Result<mpsc::Receiver<String>> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    #[cfg(unix)]
    {
        let receiver = tokio::net::unix::pipe::Receiver::from_owned_fd(reader.into())?;
        pump(receiver, tx);
    }
    #[cfg(not(unix))]
    pump_blocking(reader, tx);
    Ok(rx)
}

/// Consumes a stream of lines, fanning each one out to the display, the log
/// file and the window.
pub struct StreamTee {
    log_file: PathBuf,
    window: LogWindow,
    on_line: LineSink,
}

impl StreamTee {
    pub fn new(log_file: impl Into<PathBuf>, window: LogWindow, on_line: LineSink) -> Self {
        Self {
            log_file: log_file.into(),
            window,
            on_line,
        }
    }

    /// Drain `lines` to the end and return the populated window.
    ///
    /// The log file is truncated on open. If it cannot be opened or written,
    /// a warning is logged and draining continues without it, so the child
    /// never stalls on a full pipe.
    pub async fn run(mut self, mut lines: mpsc::Receiver<String>) -> LogWindow {
        let mut writer = open_log(&self.log_file).await;
        let mut count: u64 = 0;

        while let Some(line) = lines.recv().await {
            (self.on_line)(&line);

            if let Some(w) = writer.as_mut() {
                if let Err(e) = write_line(w, &line).await {
                    tracing::warn!(
                        path = %self.log_file.display(),
                        error = %e,
                        "failed to write build log, continuing without it"
                    );
                    writer = None;
                }
            }

            self.window.push(line);
            count += 1;
        }

        if let Some(mut w) = writer {
            if let Err(e) = w.flush().await {
                tracing::warn!(path = %self.log_file.display(), error = %e, "failed to flush build log");
            }
        }

        tracing::debug!(lines = count, retained = self.window.len(), "output stream finished");
        self.window
    }
}

async fn open_log(path: &Path) -> Option<BufWriter<File>> {
    match File::create(path).await {
        Ok(file) => Some(BufWriter::new(file)),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to open build log");
            None
        }
    }
}

async fn write_line(writer: &mut BufWriter<File>, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(LINE_ENDING.as_bytes()).await
}
