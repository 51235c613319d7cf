use qrpc_service_registry::{MemoryRegistry, RegistryError, RegistryOptions, ServiceRegistry};
use std::sync::Arc;

#[tokio::test]
async fn register_then_resolve() {
    let registry = MemoryRegistry::new();
    registry
        .create_client(&RegistryOptions::default())
        .await
        .expect("create client");

    registry
        .register_service("goods", "127.0.0.1", 9222)
        .await
        .expect("register");

    assert_eq!(
        registry.resolve("goods").await,
        Ok("127.0.0.1:9222".to_string())
    );
}

#[tokio::test]
async fn unknown_name_is_not_found() {
    let registry = MemoryRegistry::new();
    registry
        .create_client(&RegistryOptions::default())
        .await
        .expect("create client");

    assert_eq!(
        registry.resolve("orders").await,
        Err(RegistryError::NotFound("orders".into()))
    );
}

#[tokio::test]
async fn operations_require_a_connected_client() {
    let registry = MemoryRegistry::new();

    assert_eq!(
        registry.register_service("goods", "127.0.0.1", 1).await,
        Err(RegistryError::NotConnected)
    );
    assert_eq!(
        registry.resolve("goods").await,
        Err(RegistryError::NotConnected)
    );

    registry
        .create_client(&RegistryOptions::default())
        .await
        .expect("create client");
    registry.close().await.expect("close");

    assert_eq!(
        registry.resolve("goods").await,
        Err(RegistryError::NotConnected)
    );
}

#[tokio::test]
async fn empty_endpoint_list_is_rejected() {
    let registry = MemoryRegistry::new();
    let options = RegistryOptions::default().with_endpoints(Vec::<String>::new());

    assert!(matches!(
        registry.create_client(&options).await,
        Err(RegistryError::Backend(_))
    ));
    assert!(!registry.is_connected());
}

#[tokio::test]
async fn clones_share_the_directory_but_not_the_connection() {
    let server_side = MemoryRegistry::new();
    let client_side: Arc<dyn ServiceRegistry> = Arc::new(server_side.clone());

    server_side
        .create_client(&RegistryOptions::default())
        .await
        .expect("server create client");
    server_side
        .register_service("goods", "10.0.0.5", 8082)
        .await
        .expect("register");

    assert_eq!(
        client_side.resolve("goods").await,
        Err(RegistryError::NotConnected)
    );

    client_side
        .create_client(&RegistryOptions::default())
        .await
        .expect("client create client");

    assert_eq!(
        client_side.resolve("goods").await,
        Ok("10.0.0.5:8082".to_string())
    );
}
