//! JSON-lines replay source: one `{"sender","content","timestamp"}` object per line.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use omni_chat_window::ChatMessage;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};

use super::{MessageSource, SourceBatch, SourceError};

/// Replays recorded messages in fixed-size batches.
pub struct JsonLinesSource<R> {
    lines: Lines<BufReader<R>>,
    batch_size: usize,
    interval: Duration,
    line_no: u64,
    finished: bool,
}

impl<R: AsyncRead + Unpin + Send> JsonLinesSource<R> {
    /// Wrap a reader; batches hold at most `batch_size` messages.
    pub fn new(reader: R, batch_size: usize, interval: Duration) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            batch_size: batch_size.max(1),
            interval,
            line_no: 0,
            finished: false,
        }
    }
}

/// Open a replay file, or stdin when `path` is `None` or `-`.
///
/// # Errors
///
/// [`SourceError::Io`] when the file cannot be opened.
pub async fn open_replay(
    path: Option<&Path>,
    batch_size: usize,
    interval: Duration,
) -> Result<JsonLinesSource<Box<dyn AsyncRead + Unpin + Send>>, SourceError> {
    let reader: Box<dyn AsyncRead + Unpin + Send> = match path {
        Some(path) if path != Path::new("-") => Box::new(tokio::fs::File::open(path).await?),
        _ => Box::new(tokio::io::stdin()),
    };
    Ok(JsonLinesSource::new(reader, batch_size, interval))
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> MessageSource for JsonLinesSource<R> {
    fn name(&self) -> &str {
        "replay"
    }

    async fn next_batch(&mut self) -> Result<Option<SourceBatch>, SourceError> {
        if self.finished {
            return Ok(None);
        }
        let mut messages = Vec::with_capacity(self.batch_size);
        while messages.len() < self.batch_size {
            let Some(line) = self.lines.next_line().await? else {
                self.finished = true;
                break;
            };
            self.line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<ChatMessage>(line) {
                Ok(message) => messages.push(message),
                Err(error) => {
                    tracing::warn!(
                        event = "livechat.replay.invalid_line",
                        line = self.line_no,
                        error = %error,
                        "ignoring invalid replay line"
                    );
                }
            }
        }
        if messages.is_empty() && self.finished {
            return Ok(None);
        }
        Ok(Some(SourceBatch {
            messages,
            poll_after: self.interval,
        }))
    }
}
