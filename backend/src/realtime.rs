//! Row-change feeds over the realtime websocket.
//!
//! PROTOCOL
//! ========
//! The service speaks Phoenix channels: JSON messages shaped
//! `{topic, event, payload, ref}`. A subscription joins one topic with a
//! `postgres_changes` filter, keeps the socket alive with a heartbeat on the
//! `phoenix` topic, and receives `postgres_changes` events carrying the
//! changed row.
//!
//! LIFECYCLE
//! =========
//! Each [`ChangeStream`] owns its socket task. Unsubscribing or dropping the
//! stream aborts the task; a closed socket or refused join ends the stream.
//! There is no reconnect.

#[cfg(test)]
#[path = "realtime_test.rs"]
mod realtime_test;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use crate::auth::{SessionSlot, access_token};
use crate::config::BackendConfig;
use crate::error::BackendError;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const CHANGE_BUFFER: usize = 64;
const JOIN_REF: &str = "1";

/// Which row operations a subscription wants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    #[serde(rename = "*")]
    All,
    #[serde(rename = "INSERT")]
    Insert,
    #[serde(rename = "UPDATE")]
    Update,
    #[serde(rename = "DELETE")]
    Delete,
}

/// A `postgres_changes` subscription filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangeFilter {
    pub event: ChangeKind,
    pub schema: String,
    pub table: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl ChangeFilter {
    /// Every insert, update, and delete on `public.appointments`.
    #[must_use]
    pub fn appointments() -> Self {
        Self { event: ChangeKind::All, schema: "public".to_owned(), table: "appointments".to_owned(), filter: None }
    }

    /// Updates of one `public.users` row.
    #[must_use]
    pub fn user_profile(user_id: &str) -> Self {
        Self {
            event: ChangeKind::Update,
            schema: "public".to_owned(),
            table: "users".to_owned(),
            filter: Some(format!("id=eq.{user_id}")),
        }
    }
}

/// One row change delivered by the feed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub schema: String,
    pub table: String,
    #[serde(default)]
    pub commit_timestamp: Option<String>,
    /// Row after the change; absent for deletes.
    #[serde(default)]
    pub record: Value,
    /// Row before the change, when the table publishes it.
    #[serde(default)]
    pub old_record: Value,
}

impl ChangeEvent {
    /// Decode the changed row into a typed record.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Parse`] if the row does not match `T`.
    pub fn record_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, BackendError> {
        serde_json::from_value(self.record.clone()).map_err(|e| BackendError::Parse(e.to_string()))
    }
}

/// What a received socket message means for a subscription.
#[derive(Debug, PartialEq)]
pub(crate) enum Inbound {
    Change(ChangeEvent),
    JoinRefused(String),
    Ignored,
}

#[derive(Deserialize)]
struct PhoenixMessage {
    event: String,
    #[serde(default)]
    payload: Value,
    #[serde(rename = "ref", default)]
    msg_ref: Option<String>,
}

pub(crate) fn topic_for(channel: &str) -> String {
    format!("realtime:{channel}")
}

pub(crate) fn join_message(topic: &str, filter: &ChangeFilter, token: Option<&str>) -> Value {
    let mut payload = json!({
        "config": {
            "broadcast": { "self": false },
            "presence": { "key": "" },
            "postgres_changes": [filter],
        }
    });
    if let Some(token) = token {
        payload["access_token"] = Value::String(token.to_owned());
    }
    json!({ "topic": topic, "event": "phx_join", "payload": payload, "ref": JOIN_REF })
}

pub(crate) fn heartbeat_message(msg_ref: u64) -> Value {
    json!({ "topic": "phoenix", "event": "heartbeat", "payload": {}, "ref": msg_ref.to_string() })
}

pub(crate) fn leave_message(topic: &str, msg_ref: u64) -> Value {
    json!({ "topic": topic, "event": "phx_leave", "payload": {}, "ref": msg_ref.to_string() })
}

pub(crate) fn decode_inbound(text: &str) -> Inbound {
    let Ok(message) = serde_json::from_str::<PhoenixMessage>(text) else {
        return Inbound::Ignored;
    };
    match message.event.as_str() {
        "postgres_changes" => {
            let Some(data) = message.payload.get("data") else {
                warn!("postgres_changes message without data");
                return Inbound::Ignored;
            };
            match serde_json::from_value::<ChangeEvent>(data.clone()) {
                Ok(change) => Inbound::Change(change),
                Err(e) => {
                    warn!(error = %e, "undecodable postgres_changes payload");
                    Inbound::Ignored
                }
            }
        }
        "phx_reply" if message.msg_ref.as_deref() == Some(JOIN_REF) => {
            if message.payload.get("status").and_then(Value::as_str) == Some("ok") {
                Inbound::Ignored
            } else {
                let reason = message
                    .payload
                    .pointer("/response/reason")
                    .and_then(Value::as_str)
                    .unwrap_or("join refused")
                    .to_owned();
                Inbound::JoinRefused(reason)
            }
        }
        "phx_error" => Inbound::JoinRefused("channel error".to_owned()),
        _ => Inbound::Ignored,
    }
}

/// Opens change-feed subscriptions.
pub struct RealtimeClient {
    url: String,
    session: SessionSlot,
}

impl RealtimeClient {
    pub(crate) fn new(config: &BackendConfig, session: SessionSlot) -> Self {
        Self { url: config.realtime_url(), session }
    }

    /// Subscribe to all changes on `appointments`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Realtime`] if the socket cannot be opened.
    pub async fn appointments(&self) -> Result<ChangeStream, BackendError> {
        self.subscribe("appointments_changes", ChangeFilter::appointments())
            .await
    }

    /// Subscribe to updates of one user's account row.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Realtime`] if the socket cannot be opened.
    pub async fn user_profile(&self, user_id: &str) -> Result<ChangeStream, BackendError> {
        self.subscribe(&format!("user_{user_id}_changes"), ChangeFilter::user_profile(user_id))
            .await
    }

    /// Open a socket, join `channel` with `filter`, and stream its changes.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Realtime`] if the socket cannot be opened or
    /// the join message cannot be sent.
    pub async fn subscribe(&self, channel: &str, filter: ChangeFilter) -> Result<ChangeStream, BackendError> {
        let topic = topic_for(channel);
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .map_err(|e| BackendError::Realtime(e.to_string()))?;
        let (mut write, mut read) = socket.split();

        let join = join_message(&topic, &filter, access_token(&self.session).as_deref());
        write
            .send(Message::Text(join.to_string().into()))
            .await
            .map_err(|e| BackendError::Realtime(e.to_string()))?;
        debug!(%topic, table = %filter.table, "realtime channel joined");

        let (tx, rx) = mpsc::channel(CHANGE_BUFFER);
        let task = tokio::spawn(async move {
            let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
            heartbeat.tick().await;
            let mut next_ref: u64 = 2;
            loop {
                tokio::select! {
                    _ = heartbeat.tick() => {
                        let beat = heartbeat_message(next_ref);
                        next_ref += 1;
                        if write.send(Message::Text(beat.to_string().into())).await.is_err() {
                            break;
                        }
                    }
                    message = read.next() => match message {
                        Some(Ok(Message::Text(text))) => match decode_inbound(text.as_str()) {
                            Inbound::Change(change) => {
                                if tx.send(change).await.is_err() {
                                    let _ = write.send(Message::Text(leave_message(&topic, next_ref).to_string().into())).await;
                                    break;
                                }
                            }
                            Inbound::JoinRefused(reason) => {
                                warn!(%topic, %reason, "realtime channel refused");
                                break;
                            }
                            Inbound::Ignored => {}
                        },
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(error)) => {
                            warn!(%topic, %error, "realtime socket error");
                            break;
                        }
                    },
                }
            }
            debug!(%topic, "realtime channel closed");
        });

        Ok(ChangeStream { rx, task })
    }
}

/// Live subscription handle. Dropping it unsubscribes.
pub struct ChangeStream {
    rx: mpsc::Receiver<ChangeEvent>,
    task: JoinHandle<()>,
}

impl ChangeStream {
    /// Next change, or `None` once the channel has closed.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Stop the feed and close the socket.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for ChangeStream {
    fn drop(&mut self) {
        self.task.abort();
    }
}
