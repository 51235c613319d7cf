use crate::{ClientOptions, RpcClient, error::RpcClientError};
use qrpc::rpc::{FromValue, RpcResponse, Value};

/// Makes calls with retries, opening a new connection for every attempt.
#[derive(Debug, Clone, Default)]
pub struct RpcClientProxy {
    options: ClientOptions,
}

impl RpcClientProxy {
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Calls `service_name.method_name` up to `retries` times.
    ///
    /// Only transport errors (resolve, connect, send) are retried. A
    /// response is returned as soon as one arrives, whatever its code.
    /// After the last failed attempt its error is returned.
    pub async fn call(
        &self,
        service_name: &str,
        method_name: &str,
        args: Vec<Value>,
    ) -> Result<RpcResponse, RpcClientError> {
        let retries = self.options.retries;
        let mut last_error = RpcClientError::NoAttempts;

        for attempt in 1..=retries {
            let mut client =
                RpcClient::new(self.options.clone()).with_service_name(service_name);

            let result = match client.connect().await {
                Ok(()) => client.invoke(service_name, method_name, args.clone()).await,
                Err(err) => Err(err),
            };
            client.close().await;

            match result {
                Ok(response) => return Ok(response),
                Err(err) => {
                    tracing::warn!(
                        "Call to `{}.{}` failed (attempt {}/{}): {}",
                        service_name,
                        method_name,
                        attempt,
                        retries,
                        err
                    );
                    last_error = err;
                }
            }

            if attempt < retries && !self.options.retry_delay.is_zero() {
                tokio::time::sleep(self.options.retry_delay).await;
            }
        }

        if retries > 0 {
            tracing::error!(
                "Call to `{}.{}` failed after {} attempts",
                service_name,
                method_name,
                retries
            );
        }

        Err(last_error)
    }

    /// Like [`call`](Self::call), then converts a `200` response's data into
    /// `T`. Other codes become [`RpcClientError::Call`].
    pub async fn call_typed<T: FromValue>(
        &self,
        service_name: &str,
        method_name: &str,
        args: Vec<Value>,
    ) -> Result<T, RpcClientError> {
        let response = self.call(service_name, method_name, args).await?;
        Ok(response.into_result()?)
    }
}
