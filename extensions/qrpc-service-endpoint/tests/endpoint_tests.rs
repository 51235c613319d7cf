use qrpc::constants::{CODE_ERROR, CODE_SUCCESS};
use qrpc::rpc::{IntoValue, RpcRequest, Value};
use qrpc_service_endpoint::{
    NO_SERVICE_FOUND, NO_SERVICE_METHOD_FOUND, RpcService, RpcServiceEndpoint,
    error::{RpcMethodError, RpcServiceEndpointError},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

fn math_service() -> RpcService {
    let mut service = RpcService::new();

    service
        .register("Add", |(a, b): (i64, i64)| async move {
            Ok::<_, String>(a + b)
        })
        .expect("register Add");

    service
        .register("Divide", |(a, b): (f64, f64)| async move {
            if b == 0.0 {
                Err("division by zero".to_string())
            } else {
                Ok(a / b)
            }
        })
        .expect("register Divide");

    service
        .register_raw("Count", |args: Vec<Value>| async move {
            Ok::<_, RpcMethodError>(args.len().into_value())
        })
        .expect("register Count");

    service
}

fn endpoint() -> RpcServiceEndpoint {
    let mut endpoint = RpcServiceEndpoint::new();
    endpoint
        .register("math", math_service())
        .expect("register math");
    endpoint
}

#[tokio::test]
async fn dispatch_success_returns_first_value() {
    let response = endpoint()
        .dispatch(RpcRequest::new(
            5,
            "math",
            "Add",
            vec![Value::Int(2), Value::Int(40)],
        ))
        .await;

    assert_eq!(response.request_id, 5);
    assert_eq!(response.code, CODE_SUCCESS);
    assert_eq!(response.data, Value::Int(42));
}

#[tokio::test]
async fn dispatch_unknown_service() {
    let response = endpoint()
        .dispatch(RpcRequest::new(6, "nope", "Add", vec![]))
        .await;

    assert_eq!(response.request_id, 6);
    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.message, NO_SERVICE_FOUND);
}

#[tokio::test]
async fn dispatch_unknown_method() {
    let response = endpoint()
        .dispatch(RpcRequest::new(7, "math", "Multiply", vec![]))
        .await;

    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.message, NO_SERVICE_METHOD_FOUND);
}

#[tokio::test]
async fn dispatch_method_error_carries_its_text() {
    let response = endpoint()
        .dispatch(RpcRequest::new(
            8,
            "math",
            "Divide",
            vec![Value::Float(1.0), Value::Int(0)],
        ))
        .await;

    assert_eq!(response.code, CODE_ERROR);
    assert_eq!(response.message, "division by zero");
    assert_eq!(response.data, Value::Null);
}

#[tokio::test]
async fn dispatch_rejects_bad_arguments_without_calling_handler() {
    let calls = Arc::new(AtomicUsize::new(0));

    let mut service = RpcService::new();
    {
        let calls = calls.clone();
        service
            .register("Echo", move |(s,): (String,)| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, String>(s) }
            })
            .expect("register Echo");
    }

    let mut endpoint = RpcServiceEndpoint::new();
    endpoint.register("echo", service).expect("register echo");

    let wrong_type = endpoint
        .dispatch(RpcRequest::new(9, "echo", "Echo", vec![Value::Int(1)]))
        .await;
    assert_eq!(wrong_type.code, CODE_ERROR);
    assert!(wrong_type.message.starts_with("argument 0"), "{}", wrong_type.message);

    let wrong_arity = endpoint
        .dispatch(RpcRequest::new(10, "echo", "Echo", vec![]))
        .await;
    assert_eq!(
        wrong_arity.message,
        RpcMethodError::Arity {
            expected: 1,
            actual: 0
        }
        .to_string()
    );

    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn raw_handlers_see_all_arguments() {
    let response = endpoint()
        .dispatch(RpcRequest::new(
            11,
            "math",
            "Count",
            vec![Value::Null, Value::Bool(true), Value::Str("x".into())],
        ))
        .await;

    assert_eq!(response.data, Value::Int(3));
}

#[test]
fn duplicate_registrations_are_rejected() {
    let mut service = math_service();
    let duplicate = service.register("Add", |(): ()| async { Ok::<_, String>(()) });
    assert!(matches!(
        duplicate,
        Err(RpcServiceEndpointError::DuplicateMethod(name)) if name == "Add"
    ));

    let mut endpoint = endpoint();
    assert_eq!(
        endpoint.register("math", RpcService::new()),
        Err(RpcServiceEndpointError::DuplicateService("math".into()))
    );
}
