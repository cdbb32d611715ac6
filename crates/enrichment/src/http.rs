//! Blocking page fetches over a shared `ureq` agent.

use crate::error::{EnrichmentError, Result};
use std::time::Duration;
use tracing::debug;

pub(crate) fn build_agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(timeout)
        .timeout_read(timeout)
        .timeout_write(timeout)
        .build()
}

/// GET `url` with `headers` and return the body; anything but 200 is an error
pub(crate) fn fetch_text(
    agent: &ureq::Agent,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<String> {
    debug!("GET {}", url);
    let mut request = agent.get(url);
    for (name, value) in headers {
        request = request.set(name, value);
    }

    let response = match request.call() {
        Ok(response) => response,
        Err(ureq::Error::Status(code, _)) => {
            return Err(EnrichmentError::Status {
                url: url.to_string(),
                code,
            });
        }
        Err(ureq::Error::Transport(transport)) => {
            return Err(EnrichmentError::Transport {
                url: url.to_string(),
                message: transport.to_string(),
            });
        }
    };

    if response.status() != 200 {
        return Err(EnrichmentError::Status {
            url: url.to_string(),
            code: response.status(),
        });
    }

    response.into_string().map_err(|source| EnrichmentError::Body {
        url: url.to_string(),
        source,
    })
}
