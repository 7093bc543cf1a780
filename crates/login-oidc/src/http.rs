//! The HTTP client `openidconnect` sends its requests through.

use std::{future::Future, pin::Pin, time::Duration};

use openidconnect::{
  AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, reqwest,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
  #[error(transparent)]
  Client(#[from] HttpClientError<reqwest::Error>),

  #[error("provider unavailable (HTTP {0})")]
  Unavailable(u16),
}

/// Wraps the re-exported reqwest client and reports 5xx responses as
/// transport errors, so they surface as retryable request failures instead
/// of provider error responses.
#[derive(Debug, Clone)]
pub struct Transport {
  client: reqwest::Client,
}

impl Transport {
  pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .redirect(reqwest::redirect::Policy::none())
      .build()?;
    Ok(Self { client })
  }
}

impl<'c> AsyncHttpClient<'c> for Transport {
  type Error = TransportError;
  type Future =
    Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'c>>;

  fn call(&'c self, request: HttpRequest) -> Self::Future {
    Box::pin(async move {
      let response = AsyncHttpClient::call(&self.client, request).await?;
      let status = response.status();
      if status.is_server_error() {
        return Err(TransportError::Unavailable(status.as_u16()));
      }
      Ok(response)
    })
  }
}
