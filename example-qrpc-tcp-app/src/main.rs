use example_qrpc_service_definition::{FIND_METHOD, GOODS_SERVICE, GoodsResult, goods_service};
use qrpc::frame::SerializeType;
use qrpc::rpc::{IntoValue, Value};
use qrpc_service_registry::{MemoryRegistry, RegistryOptions};
use qrpc_tokio_client::{ClientOptions, RpcClientProxy};
use qrpc_tokio_server::{RpcServer, ServerOptions};
use std::{error::Error, sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

fn server_options_from_env() -> Result<ServerOptions, Box<dyn Error>> {
    let mut options = ServerOptions::default();

    if let Ok(host) = std::env::var("QRPC_HOST") {
        options = options.with_host(host);
    }
    if let Ok(port) = std::env::var("QRPC_PORT") {
        options = options.with_port(port.parse()?);
    }

    Ok(options)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Server and clients hold separate handles onto one directory.
    let registry = MemoryRegistry::new();

    let server_handle = {
        let mut server = RpcServer::new(server_options_from_env()?);
        let listener = server.bind().await?;
        server.register(GOODS_SERVICE, goods_service()?)?;
        server.set_registry(Arc::new(registry.clone()), RegistryOptions::default());
        server.set_limiter(100.0, 10);

        let handle = server.shutdown_handle();
        tokio::spawn(async move {
            if let Err(err) = server.serve_with_listener(listener).await {
                tracing::error!("Server failed: {}", err);
            }
        });
        handle
    };

    // Wait briefly for the server to advertise itself
    tokio::time::sleep(Duration::from_millis(200)).await;

    for serialize_type in [SerializeType::Native, SerializeType::Protobuf] {
        let proxy = RpcClientProxy::new(
            ClientOptions::default()
                .with_serialize_type(serialize_type)
                .with_registry(Arc::new(registry.clone()), RegistryOptions::default()),
        );

        let result: GoodsResult = proxy
            .call_typed(GOODS_SERVICE, FIND_METHOD, vec![1000i64.into_value()])
            .await?;
        println!("Find(1000) via {:?}: {:?}", serialize_type, result);
    }

    let proxy = RpcClientProxy::new(
        ClientOptions::default().with_registry(Arc::new(registry.clone()), RegistryOptions::default()),
    );
    let missing = proxy
        .call(GOODS_SERVICE, "Delete", vec![Value::Int(1000)])
        .await?;
    println!(
        "Delete(1000): code {} message {:?}",
        missing.code, missing.message
    );

    server_handle.stop();
    Ok(())
}
