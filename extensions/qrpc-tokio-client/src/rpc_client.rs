use crate::{ClientOptions, error::RpcClientError};
use qrpc::{
    frame::{CompressType, SerializeType, read_frame, write_frame},
    rpc::{RpcMessage, RpcRequest, RpcResponse, Value, decode_message, encode_message},
    utils::next_request_id,
};
use tokio::{
    io::AsyncWriteExt,
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::oneshot,
};

/// A single-use connection to a qrpc server.
///
/// `connect` opens the socket, `invoke` sends one request and waits for its
/// response, `close` shuts the socket down. A client is not reused across
/// calls; [`RpcClientProxy`](crate::RpcClientProxy) creates a fresh one for
/// each attempt.
pub struct RpcClient {
    options: ClientOptions,
    service_name: Option<String>,
    stream: Option<TcpStream>,
    writer: Option<OwnedWriteHalf>,
    used: bool,
}

impl RpcClient {
    pub fn new(options: ClientOptions) -> Self {
        Self {
            options,
            service_name: None,
            stream: None,
            writer: None,
            used: false,
        }
    }

    /// Name looked up in the registry on `connect`, if one is configured.
    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some() || self.writer.is_some()
    }

    async fn resolve_address(&self) -> Result<String, RpcClientError> {
        match (&self.options.registry, &self.service_name) {
            (Some((registry, registry_options)), Some(service_name)) => {
                registry.create_client(registry_options).await?;
                let resolved = registry.resolve(service_name).await;

                if let Err(err) = registry.close().await {
                    tracing::warn!("Failed to close registry client: {}", err);
                }

                let addr = resolved?;
                tracing::debug!("Resolved service `{}` to {}", service_name, addr);
                Ok(addr)
            }
            _ => Ok(format!("{}:{}", self.options.host, self.options.port)),
        }
    }

    /// Resolves the target address and dials it within the connection
    /// timeout.
    pub async fn connect(&mut self) -> Result<(), RpcClientError> {
        let addr = self.resolve_address().await?;
        let timeout = self.options.connection_timeout;

        let stream = match tokio::time::timeout(timeout, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => return Err(RpcClientError::Connect { addr, source }),
            Err(_) => return Err(RpcClientError::ConnectTimeout { addr, timeout }),
        };

        tracing::debug!("Connected to {}", addr);
        self.stream = Some(stream);
        Ok(())
    }

    /// Sends one request and returns the server's response.
    ///
    /// Errors are returned only for failures before the request was written.
    /// Anything that goes wrong while waiting for the answer, including a
    /// closed connection or a malformed frame, is reported as a `500`
    /// response carrying the request id.
    pub async fn invoke(
        &mut self,
        service_name: &str,
        method_name: &str,
        args: Vec<Value>,
    ) -> Result<RpcResponse, RpcClientError> {
        if self.used {
            return Err(RpcClientError::ConnectionUsed);
        }

        let stream = self.stream.take().ok_or(RpcClientError::NotConnected)?;
        self.used = true;

        let (reader, mut writer) = stream.into_split();

        let serialize_type = self.options.serialize_type;
        let compress_type = self.options.compress_type;

        let request_id = next_request_id();
        let request = RpcRequest::new(request_id, service_name, method_name, args);

        let (header, body) = encode_message(
            &RpcMessage::Request(request),
            serialize_type,
            compress_type,
        )?;

        let written = write_frame(&mut writer, &header, &body).await;
        self.writer = Some(writer);
        written?;

        let (tx, rx) = oneshot::channel();
        tokio::spawn(Self::reader_task(
            reader,
            request_id,
            serialize_type,
            compress_type,
            tx,
        ));

        // A reader that dies without answering drops `tx`.
        Ok(rx.await.unwrap_or_else(|_| {
            failure(
                request_id,
                serialize_type,
                compress_type,
                "response reader aborted",
            )
        }))
    }

    async fn reader_task(
        mut reader: OwnedReadHalf,
        request_id: u64,
        serialize_type: SerializeType,
        compress_type: CompressType,
        tx: oneshot::Sender<RpcResponse>,
    ) {
        let fail = |message: String| failure(request_id, serialize_type, compress_type, message);

        let response = match read_frame(&mut reader).await {
            Ok(frame) => match decode_message(&frame) {
                Ok(RpcMessage::Response(response))
                    if response.request_id == request_id || response.request_id == 0 =>
                {
                    response
                }
                Ok(RpcMessage::Response(response)) => fail(format!(
                    "response id {} does not match request id {}",
                    response.request_id, request_id
                )),
                Ok(RpcMessage::Request(_)) => {
                    fail("expected a response message, got a request".to_string())
                }
                Err(err) => fail(err.to_string()),
            },
            Err(err) => fail(err.to_string()),
        };

        if response.code != qrpc::constants::CODE_SUCCESS {
            tracing::debug!(
                "Request {} answered with code {}: {}",
                request_id,
                response.code,
                response.message
            );
        }

        let _ = tx.send(response);
    }

    /// Shuts the connection down. Safe to call more than once.
    pub async fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(err) = writer.shutdown().await {
                tracing::trace!("Shutdown failed: {}", err);
            }
        }

        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = stream.shutdown().await {
                tracing::trace!("Shutdown failed: {}", err);
            }
        }
    }
}

fn failure(
    request_id: u64,
    serialize_type: SerializeType,
    compress_type: CompressType,
    message: impl Into<String>,
) -> RpcResponse {
    RpcResponse::error(request_id, message).with_codecs(serialize_type, compress_type)
}
