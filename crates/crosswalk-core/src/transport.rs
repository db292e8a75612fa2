//! Inbound transport
//!
//! The relay consumes raw envelopes from an [`EventSource`]. Two sources ship
//! with the crate: an in-process pub/sub channel and a line reader over any
//! async buffered reader (stdin, files, sockets). Messages published on other
//! channels are dropped by the source.

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;
use tracing::debug;

use crate::event::ChangeEvent;

/// Default pub/sub channel name
pub const DEFAULT_CHANNEL: &str = "crud-channel";

/// Transport failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Channel closed")]
    Closed,
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// One raw message as delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub channel: String,
    pub body: String,
}

impl InboundMessage {
    pub fn new(channel: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            body: body.into(),
        }
    }
}

/// Source of raw envelopes.
#[async_trait]
pub trait EventSource: Send {
    /// Next message on the subscribed channel; `None` once the source is
    /// exhausted.
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, TransportError>;

    /// Human-readable description for logs
    fn describe(&self) -> String;
}

/// Create a connected publisher/source pair on `channel`.
pub fn channel(name: impl Into<String>, capacity: usize) -> (ChannelPublisher, ChannelSource) {
    let name = name.into();
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        ChannelPublisher {
            tx,
            channel: name.clone(),
        },
        ChannelSource { rx, channel: name },
    )
}

/// Publishing half of the in-process channel.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: mpsc::Sender<InboundMessage>,
    channel: String,
}

impl ChannelPublisher {
    /// Publish a raw envelope on the subscribed channel.
    pub async fn publish(&self, body: impl Into<String>) -> Result<(), TransportError> {
        self.publish_to(self.channel.clone(), body).await
    }

    /// Publish a raw envelope on an arbitrary channel.
    pub async fn publish_to(
        &self,
        channel: impl Into<String>,
        body: impl Into<String>,
    ) -> Result<(), TransportError> {
        self.tx
            .send(InboundMessage::new(channel, body))
            .await
            .map_err(|_| TransportError::Closed)
    }

    /// Publish an event in wire format.
    pub async fn publish_event(&self, event: &ChangeEvent) -> Result<(), TransportError> {
        self.publish(event.to_wire()).await
    }
}

/// Subscribing half of the in-process channel.
#[derive(Debug)]
pub struct ChannelSource {
    rx: mpsc::Receiver<InboundMessage>,
    channel: String,
}

#[async_trait]
impl EventSource for ChannelSource {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        while let Some(message) = self.rx.recv().await {
            if message.channel == self.channel {
                return Ok(Some(message));
            }
            debug!(
                channel = %message.channel,
                subscribed = %self.channel,
                "Ignoring message on unsubscribed channel"
            );
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        format!("channel '{}'", self.channel)
    }
}

/// Newline-delimited envelopes from an async reader. Blank lines are skipped.
pub struct LineSource<R> {
    lines: Lines<R>,
    channel: String,
    label: String,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R, channel: impl Into<String>) -> Self {
        Self {
            lines: reader.lines(),
            channel: channel.into(),
            label: "reader".to_string(),
        }
    }

    /// Set the description used in logs (builder pattern).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> EventSource for LineSource<R> {
    async fn next_message(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        while let Some(line) = self.lines.next_line().await? {
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some(InboundMessage::new(self.channel.clone(), line)));
            }
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        format!("{} (channel '{}')", self.label, self.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Operation, SourceSystem};
    use serde_json::json;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_channel_delivers_in_order() {
        let (publisher, mut source) = channel(DEFAULT_CHANNEL, 8);
        publisher.publish("one").await.unwrap();
        publisher.publish("two").await.unwrap();
        drop(publisher);

        assert_eq!(source.next_message().await.unwrap().unwrap().body, "one");
        assert_eq!(source.next_message().await.unwrap().unwrap().body, "two");
        assert_eq!(source.next_message().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_channel_ignores_other_channels() {
        let (publisher, mut source) = channel(DEFAULT_CHANNEL, 8);
        publisher.publish_to("audit-channel", "noise").await.unwrap();
        publisher.publish("signal").await.unwrap();
        drop(publisher);

        let message = source.next_message().await.unwrap().unwrap();
        assert_eq!(message.body, "signal");
        assert_eq!(message.channel, DEFAULT_CHANNEL);
        assert_eq!(source.next_message().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_publish_after_close_fails() {
        let (publisher, source) = channel(DEFAULT_CHANNEL, 1);
        drop(source);
        assert_eq!(
            publisher.publish("x").await.unwrap_err(),
            TransportError::Closed
        );
    }

    #[tokio::test]
    async fn test_publish_event_uses_wire_format() {
        let (publisher, mut source) = channel(DEFAULT_CHANNEL, 1);
        let event = ChangeEvent::new(
            "Student",
            Operation::Create,
            SourceSystem::Academic,
            json!({"id": 1}),
        );
        publisher.publish_event(&event).await.unwrap();

        let message = source.next_message().await.unwrap().unwrap();
        let decoded = ChangeEvent::decode(&message.body).unwrap();
        assert_eq!(decoded.entity, "Student");
        assert_eq!(decoded.payload, json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_line_source_skips_blank_lines() {
        let input = b"first\n\n   \nsecond\r\n" as &[u8];
        let mut source = LineSource::new(BufReader::new(input), DEFAULT_CHANNEL).with_label("stdin");

        assert_eq!(source.next_message().await.unwrap().unwrap().body, "first");
        assert_eq!(source.next_message().await.unwrap().unwrap().body, "second");
        assert_eq!(source.next_message().await.unwrap(), None);
        assert_eq!(source.describe(), "stdin (channel 'crud-channel')");
    }
}
