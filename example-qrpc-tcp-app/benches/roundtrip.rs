use criterion::{Criterion, criterion_group, criterion_main};
use example_qrpc_service_definition::{FIND_METHOD, GOODS_SERVICE, GoodsResult, goods_service};
use futures::stream::{FuturesUnordered, StreamExt};
use qrpc::frame::SerializeType;
use qrpc::rpc::Value;
use qrpc_tokio_client::{ClientOptions, RpcClientProxy};
use qrpc_tokio_server::{RpcServer, ServerOptions};
use std::hint::black_box;
use tokio::runtime::Runtime;

fn bench_roundtrip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let options = rt.block_on(async {
        let mut server = RpcServer::new(ServerOptions::default().with_port(0));
        let listener = server.bind().await.unwrap();
        let addr = listener.local_addr().unwrap();

        server
            .register(GOODS_SERVICE, goods_service().unwrap())
            .unwrap();

        tokio::spawn(async move {
            let _ = server.serve_with_listener(listener).await;
        });

        ClientOptions::default().with_address(addr.ip().to_string(), addr.port())
    });

    for serialize_type in [SerializeType::Native, SerializeType::Protobuf] {
        let proxy = RpcClientProxy::new(options.clone().with_serialize_type(serialize_type));

        c.bench_function(&format!("qrpc find roundtrip {:?}", serialize_type), |b| {
            b.to_async(&rt).iter(|| async {
                let result: GoodsResult = proxy
                    .call_typed(GOODS_SERVICE, FIND_METHOD, vec![Value::Int(1000)])
                    .await
                    .unwrap();
                black_box(result);
            });
        });

        c.bench_function(
            &format!("qrpc find roundtrip {:?} batch x10", serialize_type),
            |b| {
                b.to_async(&rt).iter(|| async {
                    let mut tasks = FuturesUnordered::new();

                    for id in 1..=10 {
                        let proxy = &proxy;
                        tasks.push(async move {
                            proxy
                                .call_typed::<GoodsResult>(
                                    GOODS_SERVICE,
                                    FIND_METHOD,
                                    vec![Value::Int(id)],
                                )
                                .await
                        });
                    }

                    while let Some(result) = tasks.next().await {
                        black_box(result.unwrap());
                    }
                });
            },
        );
    }
}

criterion_group!(benches, bench_roundtrip);
criterion_main!(benches);
