//! Line-delimited JSON host adapter
//!
//! Host messages arrive one JSON object per line on the input stream; every
//! host interaction recorded by the bridge goes back out the same way.
//!
//! # Inbound
//! - `put`: write intent, answered with exactly one `putResult`
//! - `delta`: subscription data, routed only through active subscriptions.
//!   The context must be `vessels.self`, absent, or the vessel URN given with
//!   [`Session::with_self_urn`]; hosts that resolve `vessels.self` to a URN
//!   need the latter.
//! - `subscriptionError`: terminal subscription failure
//!
//! # Outbound
//! `registerPut`, `delta`, `meta`, `emit`, `subscribe`, `pluginError`, `putResult`

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, trace, warn};

use nd_core::{DisplayBridge, MemoryHost};
use nd_protocol::{validate_message_size, Delta, PutResult, Update, MAX_MESSAGE_SIZE, SELF_CONTEXT};

fn self_context() -> String {
    SELF_CONTEXT.to_string()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Inbound {
    Put {
        #[serde(default = "self_context")]
        context: String,
        path: String,
        value: Value,
        #[serde(rename = "requestId", default)]
        request_id: Option<Value>,
    },
    Delta(Delta),
    SubscriptionError {
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct PutResultLine {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    request_id: Option<Value>,
    #[serde(flatten)]
    result: PutResult,
}

/// Bridge plus the translation to and from JSON lines
pub struct Session {
    bridge: DisplayBridge<MemoryHost>,
    self_urn: Option<String>,
}

impl Session {
    pub fn new(bridge: DisplayBridge<MemoryHost>) -> Self {
        Self {
            bridge,
            self_urn: None,
        }
    }

    /// Also accept deltas addressed to this vessel by its resolved URN
    pub fn with_self_urn(mut self, urn: impl Into<String>) -> Self {
        self.self_urn = Some(urn.into());
        self
    }

    fn is_self_context(&self, context: &str) -> bool {
        context == SELF_CONTEXT || self.self_urn.as_deref() == Some(context)
    }

    pub fn start(&mut self) -> Vec<String> {
        self.bridge.start();
        self.flush()
    }

    pub fn stop(&mut self) -> Vec<String> {
        self.bridge.stop();
        self.flush()
    }

    /// Process one inbound line and return the lines to write back
    pub fn handle_line(&mut self, line: &str) -> Vec<String> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }

        let message: Inbound = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "Discarding malformed host message");
                return Vec::new();
            }
        };

        let mut out = Vec::new();
        match message {
            Inbound::Put {
                context,
                path,
                value,
                request_id,
            } => {
                let result = self.bridge.handle_put(&context, &path, &value);
                // Commands and state go out before the acknowledgement
                out.extend(self.flush());
                out.extend(encode_line(&PutResultLine {
                    kind: "putResult",
                    request_id,
                    result,
                }));
            }
            Inbound::Delta(delta) => {
                if let Some(delta) = self.subscribed_only(delta) {
                    let outcomes = self.bridge.handle_delta(&delta);
                    trace!(?outcomes, "Delta processed");
                }
                out.extend(self.flush());
            }
            Inbound::SubscriptionError { message } => {
                self.bridge.on_subscription_error(&message);
                out.extend(self.flush());
            }
        }
        out
    }

    /// Keep only values an active subscription asked for
    fn subscribed_only(&self, delta: Delta) -> Option<Delta> {
        let context = delta.context.as_deref().unwrap_or(SELF_CONTEXT);
        if !self.is_self_context(context) {
            debug!(context, "Ignoring delta for another context");
            return None;
        }

        let host = self.bridge.host();
        let updates: Vec<Update> = delta
            .updates
            .into_iter()
            .map(|mut update| {
                update.values.retain(|pv| host.is_subscribed(&pv.path));
                update
            })
            .filter(|update| !update.values.is_empty())
            .collect();

        (!updates.is_empty()).then(|| Delta {
            context: delta.context,
            updates,
        })
    }

    fn flush(&mut self) -> Vec<String> {
        self.bridge
            .host_mut()
            .drain_events()
            .iter()
            .filter_map(encode_line)
            .collect()
    }
}

fn encode_line<T: Serialize>(message: &T) -> Option<String> {
    match serde_json::to_string(message) {
        Ok(line) => match validate_message_size(line.len()) {
            Ok(()) => Some(line),
            Err(e) => {
                warn!(error = %e, "Dropping outbound message");
                None
            }
        },
        Err(e) => {
            warn!(error = %e, "Failed to encode outbound message");
            None
        }
    }
}

/// Read one line of at most `max_len` bytes. Returns `Ok(None)` at EOF and
/// `Ok(Some(None))` for an oversized line, which is skipped entirely.
async fn read_line_bounded<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    out: &mut Vec<u8>,
    max_len: usize,
) -> std::io::Result<Option<Option<usize>>> {
    out.clear();
    let mut oversized = false;

    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(if out.is_empty() && !oversized {
                None
            } else if oversized {
                Some(None)
            } else {
                Some(Some(out.len()))
            });
        }

        let (take_len, found_newline) = match available.iter().position(|b| *b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };

        if !oversized {
            if out.len() + take_len > max_len {
                oversized = true;
                out.clear();
            } else {
                out.extend_from_slice(&available[..take_len]);
            }
        }
        reader.consume(take_len);

        if found_newline {
            return Ok(Some(if oversized { None } else { Some(out.len()) }));
        }
    }
}

async fn write_lines<W: AsyncWrite + Unpin>(writer: &mut W, lines: Vec<String>) -> std::io::Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await
}

/// Run the session until EOF or `shutdown` resolves, then stop the bridge
pub async fn run<R, W, S>(
    mut session: Session,
    mut reader: R,
    mut writer: W,
    shutdown: S,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: Future<Output = ()>,
{
    write_lines(&mut writer, session.start()).await?;
    tokio::pin!(shutdown);

    let mut buf = Vec::with_capacity(4096);
    loop {
        tokio::select! {
            read = read_line_bounded(&mut reader, &mut buf, MAX_MESSAGE_SIZE) => {
                match read? {
                    None => {
                        info!("Host stream closed");
                        break;
                    }
                    Some(None) => {
                        warn!(max = MAX_MESSAGE_SIZE, "Skipping oversized host message");
                    }
                    Some(Some(_)) => {
                        let line = String::from_utf8_lossy(&buf);
                        let replies = session.handle_line(&line);
                        write_lines(&mut writer, replies).await?;
                    }
                }
            }
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
        }
    }

    write_lines(&mut writer, session.stop()).await
}
