use std::marker::PhantomData;

use enginesvc_core::EngineError;
use enginesvc_core::transport::{self, Operation};
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::endpoint::{Endpoint, Factory};

/// Performs one operation against one instance over HTTP.
pub struct HttpEndpoint<O> {
    client: Client,
    base: Url,
    _operation: PhantomData<fn() -> O>,
}

impl<O: Operation> HttpEndpoint<O> {
    /// `instance` is `host:port`, with or without an `http://` prefix.
    pub fn new(client: Client, instance: &str) -> Result<Self, EngineError> {
        let base = instance_url(instance)?;
        Ok(Self {
            client,
            base,
            _operation: PhantomData,
        })
    }

    /// A factory sharing one connection pool across every instance.
    pub fn factory(client: Client) -> Factory<Self> {
        Box::new(move |instance| Self::new(client.clone(), instance))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

impl<O: Operation> Endpoint for HttpEndpoint<O> {
    type Request = O::Request;
    type Response = O::Response;

    async fn call(&self, request: O::Request) -> Result<O::Response, EngineError> {
        let encoded = O::encode_request(&self.base, &request)?;

        let mut builder = self.client.request(encoded.method, encoded.url);
        if let Some(body) = encoded.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(body);
        }

        let res = builder
            .send()
            .await
            .map_err(|e| EngineError::Transport(format!("{}: {e}", O::NAME)))?;
        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|e| EngineError::Transport(format!("{}: {e}", O::NAME)))?;

        transport::decode_response::<O>(status, &body)
    }
}

fn instance_url(instance: &str) -> Result<Url, EngineError> {
    let instance = if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.to_string()
    } else {
        format!("http://{instance}")
    };
    let mut url = Url::parse(&instance)
        .map_err(|e| EngineError::Transport(format!("invalid instance address {instance}: {e}")))?;
    url.set_path("");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use enginesvc_core::GetEngine;

    #[test]
    fn bare_address_gets_http_scheme() {
        let endpoint = HttpEndpoint::<GetEngine>::new(Client::new(), "10.0.0.5:8080").unwrap();
        assert_eq!(endpoint.base().as_str(), "http://10.0.0.5:8080/");
    }

    #[test]
    fn explicit_scheme_and_path_are_normalized() {
        let endpoint =
            HttpEndpoint::<GetEngine>::new(Client::new(), "https://engines.internal/v1").unwrap();
        assert_eq!(endpoint.base().as_str(), "https://engines.internal/");
    }

    #[test]
    fn host_starting_with_http_is_not_a_scheme() {
        let endpoint = HttpEndpoint::<GetEngine>::new(Client::new(), "httpgw:8080").unwrap();
        assert_eq!(endpoint.base().as_str(), "http://httpgw:8080/");
    }

    #[test]
    fn garbage_address_is_rejected() {
        assert!(HttpEndpoint::<GetEngine>::new(Client::new(), "http://[::1").is_err());
    }
}
