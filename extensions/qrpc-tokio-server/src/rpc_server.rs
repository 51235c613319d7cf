//! Note: This `RpcServer` does not include authentication or transport
//! security. It is meant for trusted, internal network communication.
//!
//! Every accepted connection carries exactly one request and one response.
//! A reader task decodes and dispatches the request; a writer task sends the
//! response and closes the socket. The two meet at a one-shot channel.

use crate::{
    ServerOptions, error::RpcServerError,
    limiter::{RateLimiter, TokenBucket, Unlimited},
};
use futures::FutureExt;
use qrpc::{
    constants::FRAME_HEADER_SIZE,
    frame::{Frame, FrameCodec, FrameDecodeError, read_frame_body, write_frame},
    rpc::{RpcMessage, RpcResponse, decode_message, encode_message},
};
use qrpc_service_endpoint::{RpcService, RpcServiceEndpoint};
use qrpc_service_registry::{RegistryOptions, ServiceRegistry};
use std::{any::Any, net::SocketAddr, panic::AssertUnwindSafe, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{
        TcpListener, TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::{oneshot, watch},
};

/// Stops a running server's accept loop. Connections already accepted are
/// allowed to finish.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

/// State shared read-only by every connection task.
struct ConnectionContext {
    endpoint: RpcServiceEndpoint,
    limiter: Arc<dyn RateLimiter>,
    limiter_timeout: Duration,
}

/// A TCP server that dispatches one request per connection to registered
/// services.
pub struct RpcServer {
    options: ServerOptions,
    endpoint: RpcServiceEndpoint,
    registry: Option<(Arc<dyn ServiceRegistry>, RegistryOptions)>,
    limiter: Arc<dyn RateLimiter>,
    shutdown: ShutdownHandle,
}

impl Default for RpcServer {
    fn default() -> Self {
        Self::new(ServerOptions::default())
    }
}

impl RpcServer {
    pub fn new(options: ServerOptions) -> Self {
        let (tx, _rx) = watch::channel(false);

        RpcServer {
            options,
            endpoint: RpcServiceEndpoint::new(),
            registry: None,
            limiter: Arc::new(Unlimited),
            shutdown: ShutdownHandle { tx: Arc::new(tx) },
        }
    }

    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Adds a service under `name`. Must happen before the server starts.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        service: RpcService,
    ) -> Result<(), RpcServerError> {
        Ok(self.endpoint.register(name, service)?)
    }

    /// Advertises every registered service to `registry` on start-up.
    pub fn set_registry(&mut self, registry: Arc<dyn ServiceRegistry>, options: RegistryOptions) {
        self.registry = Some((registry, options));
    }

    /// Installs a token bucket admitting `limit_per_sec` requests per second
    /// with bursts of up to `capacity`.
    pub fn set_limiter(&mut self, limit_per_sec: f64, capacity: u32) {
        self.limiter = Arc::new(TokenBucket::new(limit_per_sec, capacity));
    }

    pub fn set_rate_limiter(&mut self, limiter: Arc<dyn RateLimiter>) {
        self.limiter = limiter;
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Binds a listener to the configured host and port. Port `0` picks a
    /// free port; read it back from the listener's `local_addr`.
    pub async fn bind(&self) -> Result<TcpListener, RpcServerError> {
        Ok(TcpListener::bind((self.options.host.as_str(), self.options.port)).await?)
    }

    /// Binds to the configured host and port and runs until stopped.
    pub async fn serve(self) -> Result<SocketAddr, RpcServerError> {
        let listener = self.bind().await?;
        self.serve_with_listener(listener).await
    }

    /// Runs the accept loop on a pre-bound listener until stopped.
    ///
    /// Returns the address the server was listening on.
    pub async fn serve_with_listener(
        self,
        listener: TcpListener,
    ) -> Result<SocketAddr, RpcServerError> {
        let RpcServer {
            options,
            endpoint,
            registry,
            limiter,
            shutdown,
        } = self;

        let address = listener.local_addr()?;

        if let Some((registry, registry_options)) = &registry {
            let host = advertised_host(address, &options);

            registry.create_client(registry_options).await?;
            for name in endpoint.service_names() {
                registry.register_service(name, &host, address.port()).await?;
            }
        }

        let context = Arc::new(ConnectionContext {
            endpoint,
            limiter,
            limiter_timeout: options.limiter_timeout,
        });

        let mut stopped = shutdown.tx.subscribe();

        tracing::info!("Server running on {:?}", address);

        loop {
            tokio::select! {
                _ = stopped.wait_for(|stopped| *stopped) => break,

                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        tracing::info!("Client connected: {}", addr);
                        Self::handle_connection(context.clone(), stream, addr);
                    }
                    Err(err) => {
                        tracing::warn!("Failed to accept connection: {}", err);
                    }
                },
            }
        }

        if let Some((registry, _)) = &registry {
            if let Err(err) = registry.close().await {
                tracing::warn!("Failed to close registry client: {}", err);
            }
        }

        tracing::info!("Server on {:?} stopped", address);
        Ok(address)
    }

    fn handle_connection(context: Arc<ConnectionContext>, stream: TcpStream, addr: SocketAddr) {
        let (reader, writer) = stream.into_split();
        let (tx, rx) = oneshot::channel::<RpcResponse>();

        tokio::spawn(Self::writer_task(writer, rx, addr));
        tokio::spawn(Self::reader_task(context, reader, tx, addr));
    }

    /// Produces the connection's single response.
    ///
    /// A panic anywhere in decoding or dispatch drops `tx` unsent, which
    /// makes the writer close the connection without a frame.
    async fn reader_task(
        context: Arc<ConnectionContext>,
        mut reader: OwnedReadHalf,
        tx: oneshot::Sender<RpcResponse>,
        addr: SocketAddr,
    ) {
        let outcome = AssertUnwindSafe(Self::read_and_dispatch(&context, &mut reader))
            .catch_unwind()
            .await;

        match outcome {
            Ok(response) => {
                if tx.send(response).is_err() {
                    tracing::warn!("Writer for {} went away before the response", addr);
                }
            }
            Err(panic) => {
                let err = RpcServerError::InvocationPanic(panic_message(panic.as_ref()));
                tracing::error!("Request from {} aborted: {}", addr, err);
            }
        }
    }

    async fn read_and_dispatch(
        context: &ConnectionContext,
        reader: &mut OwnedReadHalf,
    ) -> RpcResponse {
        let mut header_bytes = [0u8; FRAME_HEADER_SIZE];
        if let Err(err) = reader.read_exact(&mut header_bytes).await {
            let err = FrameDecodeError::from(err);
            tracing::warn!("Failed to read request header: {}", err);
            return RpcResponse::error(0, err.to_string());
        }

        let header = match FrameCodec::decode_header(&header_bytes) {
            Ok(header) => header,
            Err(err) => {
                tracing::warn!("Invalid request header: {}", err);
                return match FrameCodec::reply_fields(&header_bytes) {
                    Some((request_id, serialize_type, compress_type)) => {
                        RpcResponse::error(request_id, err.to_string())
                            .with_codecs(serialize_type, compress_type)
                    }
                    None => RpcResponse::error(0, err.to_string()),
                };
            }
        };

        let reply =
            |response: RpcResponse| response.with_codecs(header.serialize_type, header.compress_type);

        let body = match read_frame_body(reader, &header).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("Failed to read request {} body: {}", header.request_id, err);
                return reply(RpcResponse::error(header.request_id, err.to_string()));
            }
        };

        let request = match decode_message(&Frame { header, body }) {
            Ok(RpcMessage::Request(request)) => request,
            Ok(RpcMessage::Response(_)) => {
                return reply(RpcResponse::error(
                    header.request_id,
                    "expected a request message, got a response",
                ));
            }
            Err(err) => {
                tracing::warn!("Failed to decode request {}: {}", header.request_id, err);
                return reply(RpcResponse::error(header.request_id, err.to_string()));
            }
        };

        if let Err(err) = context.limiter.acquire(context.limiter_timeout).await {
            tracing::info!("Request {} throttled: {}", request.request_id, err);
            return reply(RpcResponse::throttled(request.request_id, err.to_string()));
        }

        tracing::debug!(
            "Dispatching request {} to `{}.{}`",
            request.request_id,
            request.service_name,
            request.method_name
        );

        reply(context.endpoint.dispatch(request).await)
    }

    /// Sends the response, if any, then closes the connection.
    async fn writer_task(
        mut writer: OwnedWriteHalf,
        rx: oneshot::Receiver<RpcResponse>,
        addr: SocketAddr,
    ) {
        match rx.await {
            Ok(response) => {
                let request_id = response.request_id;
                let serialize_type = response.serialize_type;
                let compress_type = response.compress_type;

                // A result that cannot be encoded is answered with a 500
                // before any bytes go out.
                let encoded =
                    encode_message(&RpcMessage::Response(response), serialize_type, compress_type)
                        .or_else(|err| {
                            tracing::warn!(
                                "Failed to encode response {} for {}: {}",
                                request_id,
                                addr,
                                err
                            );
                            let fallback = RpcResponse::error(request_id, err.to_string())
                                .with_codecs(serialize_type, compress_type);
                            encode_message(
                                &RpcMessage::Response(fallback),
                                serialize_type,
                                compress_type,
                            )
                        });

                match encoded {
                    Ok((header, body)) => {
                        if let Err(err) = write_frame(&mut writer, &header, &body).await {
                            tracing::error!("Failed to send response to {}: {}", addr, err);
                        }
                    }
                    Err(err) => {
                        tracing::error!("Failed to encode response for {}: {}", addr, err);
                    }
                }
            }
            Err(_) => {
                tracing::debug!("No response produced for {}", addr);
            }
        }

        if let Err(err) = writer.shutdown().await {
            tracing::trace!("Shutdown of {} failed: {}", addr, err);
        }

        tracing::info!("Terminated connection for {}.", addr);
    }
}

// A listener on 0.0.0.0 or [::] is reachable at the configured host.
fn advertised_host(address: SocketAddr, options: &ServerOptions) -> String {
    if address.ip().is_unspecified() {
        options.host.clone()
    } else {
        address.ip().to_string()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
