use example_qrpc_service_definition::{FIND_METHOD, GOODS_SERVICE, GoodsResult, goods_service};
use qrpc::constants::{
    CODE_ERROR, CODE_SUCCESS, CODE_THROTTLED, FRAME_HEADER_SIZE, MAGIC_NUMBER, VERSION,
};
use qrpc::frame::{CompressType, FrameDecodeError, SerializeType, read_frame, write_frame};
use qrpc::rpc::{RpcMessage, RpcRequest, RpcResponse, Value, decode_message, encode_message};
use qrpc_service_endpoint::NO_SERVICE_FOUND;
use qrpc_service_registry::{MemoryRegistry, RegistryOptions, ServiceRegistry};
use qrpc_tokio_server::{
    RpcServer, RpcService, ServerOptions, ShutdownHandle, error::RpcServerError,
};
use std::net::SocketAddr;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

async fn start_server<F>(configure: F) -> (SocketAddr, ShutdownHandle)
where
    F: FnOnce(&mut RpcServer),
{
    let mut server = RpcServer::new(
        ServerOptions::default()
            .with_port(0)
            .with_limiter_timeout(Duration::from_millis(50)),
    );
    let listener = server.bind().await.expect("bind listener");
    let addr = listener.local_addr().expect("local addr");

    server
        .register(GOODS_SERVICE, goods_service().expect("goods service"))
        .expect("register goods");
    configure(&mut server);

    let handle = server.shutdown_handle();
    tokio::spawn(async move {
        let _ = server.serve_with_listener(listener).await;
    });

    (addr, handle)
}

/// Sends one request over a fresh connection. `None` means the server
/// closed the connection without answering.
async fn exchange(
    addr: SocketAddr,
    request: RpcRequest,
    serialize_type: SerializeType,
) -> Option<RpcResponse> {
    let mut stream = TcpStream::connect(addr).await.expect("connect");

    let (header, body) = encode_message(
        &RpcMessage::Request(request),
        serialize_type,
        CompressType::Gzip,
    )
    .expect("encode request");
    write_frame(&mut stream, &header, &body)
        .await
        .expect("write request");

    match read_frame(&mut stream).await {
        Ok(frame) => match decode_message(&frame).expect("decode response") {
            RpcMessage::Response(response) => Some(response),
            other => panic!("expected response, got {:?}", other),
        },
        Err(FrameDecodeError::Truncated(_)) => None,
        Err(err) => panic!("unexpected read error: {}", err),
    }
}

#[tokio::test]
async fn find_succeeds_with_both_serializers() {
    let (addr, handle) = start_server(|_| {}).await;

    for (request_id, serialize_type) in [(1000, SerializeType::Native), (1001, SerializeType::Protobuf)] {
        let response = exchange(
            addr,
            RpcRequest::new(request_id, GOODS_SERVICE, FIND_METHOD, vec![Value::Int(1000)]),
            serialize_type,
        )
        .await
        .expect("response");

        assert_eq!(response.request_id, request_id);
        assert_eq!(response.code, CODE_SUCCESS);
        assert_eq!(response.serialize_type, serialize_type);
        assert_eq!(response.compress_type, CompressType::Gzip);

        let result = response.into_result::<GoodsResult>().expect("goods result");
        assert_eq!(result.code, 200);
        assert_eq!(result.data.id, 1000);
    }

    handle.stop();
}

#[tokio::test]
async fn unknown_service_and_method_yield_500() {
    let (addr, handle) = start_server(|_| {}).await;

    let response = exchange(
        addr,
        RpcRequest::new(7, "orders", FIND_METHOD, vec![Value::Int(1)]),
        SerializeType::Native,
    )
    .await
    .expect("response");
    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.message, NO_SERVICE_FOUND);
    assert_eq!(response.request_id, 7);

    let response = exchange(
        addr,
        RpcRequest::new(8, GOODS_SERVICE, "Delete", vec![]),
        SerializeType::Protobuf,
    )
    .await
    .expect("response");
    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.message, "no service method found");

    handle.stop();
}

#[tokio::test]
async fn method_error_text_is_returned() {
    let (addr, handle) = start_server(|_| {}).await;

    let response = exchange(
        addr,
        RpcRequest::new(9, GOODS_SERVICE, FIND_METHOD, vec![Value::Int(-1)]),
        SerializeType::Native,
    )
    .await
    .expect("response");

    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.message, "goods -1 not found");

    handle.stop();
}

#[tokio::test]
async fn throttled_requests_never_reach_the_handler() {
    let calls = Arc::new(AtomicUsize::new(0));

    let (addr, handle) = start_server({
        let calls = calls.clone();
        move |server| {
            let mut counter = RpcService::new();
            counter
                .register("Hit", move |(): ()| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, String>(()) }
                })
                .expect("register Hit");
            server.register("counter", counter).expect("register counter");
            server.set_limiter(0.0, 0);
        }
    })
    .await;

    for request_id in 1..=3 {
        let response = exchange(
            addr,
            RpcRequest::new(request_id, "counter", "Hit", vec![]),
            SerializeType::Native,
        )
        .await
        .expect("response");

        assert_eq!(response.code, CODE_THROTTLED);
        assert_eq!(response.request_id, request_id);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    handle.stop();
}

#[tokio::test]
async fn panicking_method_closes_without_response() {
    let (addr, handle) = start_server(|server| {
        let mut service = RpcService::new();
        service
            .register("Boom", |(): ()| async {
                if true {
                    panic!("boom");
                }
                Ok::<_, String>(())
            })
            .expect("register Boom");
        server.register("faulty", service).expect("register faulty");
    })
    .await;

    let response = exchange(
        addr,
        RpcRequest::new(10, "faulty", "Boom", vec![]),
        SerializeType::Native,
    )
    .await;
    assert!(response.is_none());

    // The server keeps serving other connections.
    let response = exchange(
        addr,
        RpcRequest::new(11, GOODS_SERVICE, FIND_METHOD, vec![Value::Int(3)]),
        SerializeType::Native,
    )
    .await
    .expect("response");
    assert_eq!(response.code, CODE_SUCCESS);

    handle.stop();
}

#[tokio::test]
async fn malformed_frame_yields_500() {
    let (addr, handle) = start_server(|_| {}).await;

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    let mut garbage = vec![0u8; 17];
    garbage[0] = MAGIC_NUMBER ^ 0xff;
    stream.write_all(&garbage).await.expect("write garbage");

    let frame = read_frame(&mut stream).await.expect("response frame");
    let RpcMessage::Response(response) = decode_message(&frame).expect("decode") else {
        panic!("expected a response");
    };

    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.request_id, 0);
    assert!(response.message.contains("magic"), "{}", response.message);

    handle.stop();
}

#[tokio::test]
async fn unknown_message_type_echoes_header_request_id_and_codecs() {
    let (addr, handle) = start_server(|_| {}).await;

    let mut header = vec![MAGIC_NUMBER, VERSION];
    header.extend_from_slice(&(FRAME_HEADER_SIZE as u32).to_be_bytes());
    header.extend_from_slice(&[9, u8::from(CompressType::Gzip), u8::from(SerializeType::Protobuf)]);
    header.extend_from_slice(&77u64.to_be_bytes());

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(&header).await.expect("write header");

    let frame = read_frame(&mut stream).await.expect("response frame");
    assert_eq!(frame.header.serialize_type, SerializeType::Protobuf);
    assert_eq!(frame.header.request_id, 77);

    let RpcMessage::Response(response) = decode_message(&frame).expect("decode") else {
        panic!("expected a response");
    };
    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.request_id, 77);
    assert!(response.message.contains("message type"), "{}", response.message);

    handle.stop();
}

#[tokio::test]
async fn unencodable_result_becomes_500() {
    let (addr, handle) = start_server(|server| {
        let mut service = RpcService::new();
        service
            .register("Big", |(): ()| async { Ok::<_, String>(i64::MAX) })
            .expect("register Big");
        server.register("numbers", service).expect("register numbers");
    })
    .await;

    // Native carries the full i64.
    let response = exchange(
        addr,
        RpcRequest::new(20, "numbers", "Big", vec![]),
        SerializeType::Native,
    )
    .await
    .expect("response");
    assert_eq!(response.code, CODE_SUCCESS);
    assert_eq!(response.data, Value::Int(i64::MAX));

    // Protobuf numbers cannot, so the server answers with an error instead.
    let response = exchange(
        addr,
        RpcRequest::new(21, "numbers", "Big", vec![]),
        SerializeType::Protobuf,
    )
    .await
    .expect("response");
    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.request_id, 21);
    assert_eq!(response.serialize_type, SerializeType::Protobuf);

    handle.stop();
}

#[tokio::test]
async fn tiny_rate_limit_answers_700() {
    let (addr, handle) = start_server(|server| server.set_limiter(1e-20, 1)).await;

    let first = exchange(
        addr,
        RpcRequest::new(30, GOODS_SERVICE, FIND_METHOD, vec![Value::Int(1)]),
        SerializeType::Native,
    )
    .await
    .expect("response");
    assert_eq!(first.code, CODE_SUCCESS);

    let second = exchange(
        addr,
        RpcRequest::new(31, GOODS_SERVICE, FIND_METHOD, vec![Value::Int(1)]),
        SerializeType::Native,
    )
    .await
    .expect("response");
    assert_eq!(second.code, CODE_THROTTLED);
    assert_eq!(second.request_id, 31);

    handle.stop();
}

#[tokio::test]
async fn undecodable_body_echoes_header_request_id() {
    let (addr, handle) = start_server(|_| {}).await;

    let (header, _) = encode_message(
        &RpcMessage::Request(RpcRequest::new(55, GOODS_SERVICE, FIND_METHOD, vec![])),
        SerializeType::Protobuf,
        CompressType::Gzip,
    )
    .expect("encode");

    let mut stream = TcpStream::connect(addr).await.expect("connect");
    write_frame(&mut stream, &header, b"definitely not gzip")
        .await
        .expect("write");

    let frame = read_frame(&mut stream).await.expect("response frame");
    assert_eq!(frame.header.serialize_type, SerializeType::Protobuf);

    let RpcMessage::Response(response) = decode_message(&frame).expect("decode") else {
        panic!("expected a response");
    };
    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.request_id, 55);

    handle.stop();
}

#[tokio::test]
async fn services_are_advertised_to_the_registry() {
    let registry = MemoryRegistry::new();

    let (addr, handle) = start_server({
        let registry: Arc<dyn ServiceRegistry> = Arc::new(registry.clone());
        move |server| server.set_registry(registry, RegistryOptions::default())
    })
    .await;

    // A completed call means start-up, including advertising, is done.
    exchange(
        addr,
        RpcRequest::new(1, GOODS_SERVICE, FIND_METHOD, vec![Value::Int(1)]),
        SerializeType::Native,
    )
    .await
    .expect("response");

    registry
        .create_client(&RegistryOptions::default())
        .await
        .expect("create client");
    assert_eq!(
        registry.resolve(GOODS_SERVICE).await,
        Ok(addr.to_string())
    );

    handle.stop();
}

#[tokio::test]
async fn registry_failure_aborts_start_up() {
    let mut server = RpcServer::new(ServerOptions::default().with_port(0));
    let listener = server.bind().await.expect("bind");
    server
        .register(GOODS_SERVICE, goods_service().expect("goods service"))
        .expect("register goods");
    server.set_registry(
        Arc::new(MemoryRegistry::new()),
        RegistryOptions::default().with_endpoints(Vec::<String>::new()),
    );

    let result = server.serve_with_listener(listener).await;
    assert!(matches!(result, Err(RpcServerError::Registry(_))));
}

#[tokio::test]
async fn stop_ends_the_accept_loop() {
    let server = RpcServer::new(ServerOptions::default().with_port(0));
    let listener = server.bind().await.expect("bind");
    let expected = listener.local_addr().expect("local addr");

    let handle = server.shutdown_handle();
    let task = tokio::spawn(server.serve_with_listener(listener));

    handle.stop();
    assert!(handle.is_stopped());

    let served = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .expect("server did not stop")
        .expect("server task panicked")
        .expect("server failed");
    assert_eq!(served, expected);
}
