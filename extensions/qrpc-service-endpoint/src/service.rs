use crate::{
    FromArgs,
    error::{RpcMethodError, RpcServiceEndpointError},
};
use futures::future::{BoxFuture, FutureExt};
use qrpc::rpc::{IntoValue, Value};
use std::{
    collections::{HashMap, hash_map::Entry},
    fmt::Display,
    future::Future,
    sync::Arc,
};

pub type RpcMethodHandler =
    Arc<dyn Fn(Vec<Value>) -> BoxFuture<'static, Result<Value, RpcMethodError>> + Send + Sync>;

/// A named set of methods callable through the endpoint.
#[derive(Clone, Default)]
pub struct RpcService {
    methods: HashMap<String, RpcMethodHandler>,
}

impl RpcService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler that receives the raw argument list.
    pub fn register_raw<F, Fut>(
        &mut self,
        method_name: impl Into<String>,
        handler: F,
    ) -> Result<&mut Self, RpcServiceEndpointError>
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, RpcMethodError>> + Send + 'static,
    {
        match self.methods.entry(method_name.into()) {
            Entry::Occupied(entry) => Err(RpcServiceEndpointError::DuplicateMethod(
                entry.key().clone(),
            )),
            Entry::Vacant(entry) => {
                let wrapped = move |args: Vec<Value>| handler(args).boxed();
                entry.insert(Arc::new(wrapped));
                Ok(self)
            }
        }
    }

    /// Registers a typed handler.
    ///
    /// The argument list is converted to `Args` before `handler` runs; a
    /// conversion failure is reported without calling it. The `Ok` value is
    /// converted into the response data and the `Err` value's text into the
    /// response message.
    pub fn register<Args, R, E, F, Fut>(
        &mut self,
        method_name: impl Into<String>,
        handler: F,
    ) -> Result<&mut Self, RpcServiceEndpointError>
    where
        Args: FromArgs + 'static,
        R: IntoValue + 'static,
        E: Display + 'static,
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        self.register_raw(method_name, move |args: Vec<Value>| {
            let call = Args::from_args(args).map(&handler);
            async move {
                call?
                    .await
                    .map(IntoValue::into_value)
                    .map_err(|err| RpcMethodError::Failed(err.to_string()))
            }
        })
    }

    pub fn method(&self, method_name: &str) -> Option<&RpcMethodHandler> {
        self.methods.get(method_name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }
}
