//! Loggregator v2 ingress client.
//!
//! [`IngressConnection::start`] sets up a mutual-TLS gRPC channel and a
//! background flusher task. [`IngressClient`] handles turn each emission into
//! an [`Envelope`] and queue it without blocking; the flusher groups queued
//! envelopes into [`EnvelopeBatch`]es and sends them with the unary `Send`
//! RPC, either when `batch_max_size` envelopes are waiting or every
//! `flush_interval`.
//!
//! Envelopes are dropped when the queue is full or when a send fails.
//! Redelivery belongs to the surrounding delivery layer.

use crate::client::{ClientError, WireClient};
use crate::config::{Config, SourceInfo};
use crate::envelope::{self, Counter, Envelope, EnvelopeBatch, Gauge, GaugeValue, SendResponse};
use crate::error::ExporterError;
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint, Identity};

/// Sends envelope batches to an ingress.
pub trait EnvelopeTransport: Send + 'static {
    /// Sends one batch.
    fn send(
        &mut self,
        batch: EnvelopeBatch,
    ) -> impl Future<Output = Result<(), tonic::Status>> + Send;
}

/// gRPC transport calling `loggregator.v2.Ingress/Send`.
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    grpc: tonic::client::Grpc<Channel>,
}

impl GrpcTransport {
    /// Creates a transport over an existing channel.
    #[must_use]
    pub fn new(channel: Channel) -> Self {
        Self {
            grpc: tonic::client::Grpc::new(channel),
        }
    }
}

impl EnvelopeTransport for GrpcTransport {
    async fn send(&mut self, batch: EnvelopeBatch) -> Result<(), tonic::Status> {
        self.grpc
            .ready()
            .await
            .map_err(|e| tonic::Status::unavailable(format!("Ingress not ready: {e}")))?;

        let codec = tonic_prost::ProstCodec::<EnvelopeBatch, SendResponse>::default();
        let path = http::uri::PathAndQuery::from_static(envelope::SEND_PATH);
        let _response: tonic::Response<SendResponse> = self
            .grpc
            .unary(tonic::Request::new(batch), path, codec)
            .await?;
        Ok(())
    }
}

/// Batching knobs of the flusher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Number of envelopes that triggers a send.
    pub batch_max_size: usize,
    /// Maximum time an envelope waits before it is sent.
    pub flush_interval: Duration,
    /// Number of envelopes buffered before new ones are dropped.
    pub buffer_size: usize,
}

impl From<&Config> for BatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            batch_max_size: config.batch_max_size,
            flush_interval: config.flush_interval,
            buffer_size: config.buffer_size,
        }
    }
}

/// Cloneable handle that queues envelopes for the flusher.
#[derive(Debug, Clone)]
pub struct IngressClient {
    sender: mpsc::Sender<Envelope>,
}

impl IngressClient {
    fn enqueue(&self, envelope: Envelope) -> Result<(), ClientError> {
        self.sender.try_send(envelope).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => ClientError::BufferFull,
            mpsc::error::TrySendError::Closed(_) => ClientError::Closed,
        })
    }
}

fn new_envelope(source: &SourceInfo, message: envelope::envelope::Message) -> Envelope {
    Envelope {
        timestamp: Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        source_id: source.source_id.clone(),
        instance_id: source.instance_id.clone(),
        tags: HashMap::new(),
        message: Some(message),
    }
}

impl WireClient for IngressClient {
    fn emit_gauge(
        &self,
        name: &str,
        value: f64,
        unit: &str,
        source: &SourceInfo,
    ) -> Result<(), ClientError> {
        let gauge = Gauge {
            metrics: HashMap::from([(
                name.to_string(),
                GaugeValue {
                    unit: unit.to_string(),
                    value,
                },
            )]),
        };
        self.enqueue(new_envelope(
            source,
            envelope::envelope::Message::Gauge(gauge),
        ))
    }

    fn emit_counter(
        &self,
        name: &str,
        delta: u64,
        source: &SourceInfo,
    ) -> Result<(), ClientError> {
        let counter = Counter {
            name: name.to_string(),
            delta,
            total: 0,
        };
        self.enqueue(new_envelope(
            source,
            envelope::envelope::Message::Counter(counter),
        ))
    }
}

/// A running ingress connection: the envelope queue and its flusher task.
#[derive(Debug)]
pub struct IngressConnection {
    client: IngressClient,
    stop: oneshot::Sender<()>,
    flusher: JoinHandle<()>,
}

impl IngressConnection {
    /// Connects to the ingress described by `config` and starts the flusher.
    ///
    /// The channel connects lazily, so an unreachable endpoint surfaces as
    /// failed sends rather than here. Must be called from within a Tokio
    /// runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - A certificate or key file cannot be read
    /// - The endpoint is not a valid URI or the TLS settings are rejected
    pub async fn start(config: &Config) -> Result<Self, ExporterError> {
        config.validate_config()?;

        let ca_cert = read_pem(&config.ca_cert).await?;
        let cert = read_pem(&config.cert).await?;
        let key = read_pem(&config.key).await?;

        let tls = ClientTlsConfig::new()
            .ca_certificate(Certificate::from_pem(ca_cert))
            .identity(Identity::from_pem(cert, key))
            .domain_name(config.server_name.clone());

        let uri = config.endpoint_uri();
        let channel = Endpoint::from_shared(uri.clone())
            .map_err(|source| ExporterError::Endpoint {
                endpoint: uri.clone(),
                source,
            })?
            .tls_config(tls)
            .map_err(ExporterError::Tls)?
            .connect_lazy();

        tracing::info!(endpoint = %uri, "Loggregator ingress client started");

        Ok(Self::with_transport(
            GrpcTransport::new(channel),
            BatchSettings::from(config),
        ))
    }

    /// Starts the flusher over an arbitrary transport.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn with_transport<T: EnvelopeTransport>(transport: T, settings: BatchSettings) -> Self {
        let (sender, receiver) = mpsc::channel(settings.buffer_size.max(1));
        let (stop, stopped) = oneshot::channel();
        let flusher = tokio::spawn(run_flusher(receiver, stopped, transport, settings));

        Self {
            client: IngressClient { sender },
            stop,
            flusher,
        }
    }

    /// Returns a handle for emitting envelopes.
    #[must_use]
    pub fn client(&self) -> IngressClient {
        self.client.clone()
    }

    /// Stops accepting envelopes and sends everything still queued.
    ///
    /// Handles obtained from [`Self::client`] report [`ClientError::Closed`]
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the flusher task panicked.
    pub async fn shutdown(self) -> Result<(), ExporterError> {
        // The flusher may already be gone; joining it below reports why.
        let _ = self.stop.send(());
        self.flusher.await?;
        tracing::info!("Loggregator ingress client stopped");
        Ok(())
    }
}

async fn read_pem(path: &str) -> Result<Vec<u8>, ExporterError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| ExporterError::ReadPem {
            path: path.to_string(),
            source,
        })
}

async fn run_flusher<T: EnvelopeTransport>(
    mut receiver: mpsc::Receiver<Envelope>,
    mut stopped: oneshot::Receiver<()>,
    mut transport: T,
    settings: BatchSettings,
) {
    let batch_max_size = settings.batch_max_size.max(1);
    let mut pending = Vec::with_capacity(batch_max_size);
    // Zero periods panic in tokio.
    let period = settings.flush_interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            received = receiver.recv() => {
                let Some(envelope) = received else { break };
                pending.push(envelope);
                if pending.len() >= batch_max_size {
                    flush(&mut transport, &mut pending).await;
                }
            }
            _ = ticker.tick() => flush(&mut transport, &mut pending).await,
            _ = &mut stopped => break,
        }
    }

    receiver.close();
    while let Some(envelope) = receiver.recv().await {
        pending.push(envelope);
        if pending.len() >= batch_max_size {
            flush(&mut transport, &mut pending).await;
        }
    }
    flush(&mut transport, &mut pending).await;
}

async fn flush<T: EnvelopeTransport>(transport: &mut T, pending: &mut Vec<Envelope>) {
    if pending.is_empty() {
        return;
    }

    let batch = EnvelopeBatch {
        batch: std::mem::take(pending),
    };
    let count = batch.batch.len();

    match transport.send(batch).await {
        Ok(()) => tracing::debug!(count, "Sent envelope batch to Loggregator"),
        Err(status) => {
            tracing::warn!(error = %status, count, "Failed to send envelope batch to Loggregator");
        }
    }
}
