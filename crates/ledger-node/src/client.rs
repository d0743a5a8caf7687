use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use ledger_core::consensus::{ChainResponse, PeerClient};
use ledger_core::LedgerError;
use reqwest::Client;

/// Fetches `GET http://{peer}/chain` from other nodes.
#[derive(Clone, Debug)]
pub struct HttpPeerClient {
    http: Client,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
        })
    }
}

impl PeerClient for HttpPeerClient {
    fn fetch_chain(
        &self,
        peer: &str,
    ) -> impl Future<Output = ledger_core::Result<ChainResponse>> + Send {
        let http = self.http.clone();
        let url = format!("http://{peer}/chain");
        let peer = peer.to_owned();
        async move {
            let unreachable = |reason: String| LedgerError::UnreachablePeer {
                peer: peer.clone(),
                reason,
            };
            let res = http
                .get(&url)
                .send()
                .await
                .map_err(|e| unreachable(e.to_string()))?;
            let status = res.status();
            if !status.is_success() {
                return Err(unreachable(format!("status {status}")));
            }
            res.json::<ChainResponse>()
                .await
                .map_err(|e| unreachable(e.to_string()))
        }
    }
}
