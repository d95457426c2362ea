//! Named gateway registry owned by the process driver.
//!
//! All configured endpoints are dialled concurrently at startup; any endpoint
//! that cannot be reached makes the whole run fail before a single account is
//! touched.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::blockchain::client::{ChainGateway, RpcGateway};
use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::config::RpcConfig;

/// Connected gateways keyed by endpoint name.
#[derive(Debug, Default)]
pub struct GatewayRegistry {
    gateways: BTreeMap<String, Arc<RpcGateway>>,
}

impl GatewayRegistry {
    /// Connect to every endpoint in `config`.
    pub async fn connect(config: &RpcConfig, cancel: &CancellationToken) -> BlockchainResult<Self> {
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
        let request_timeout = Duration::from_secs(config.timeout_secs);

        let mut pending = JoinSet::new();
        for (name, url) in &config.endpoints {
            let (name, url, cancel) = (name.clone(), url.clone(), cancel.clone());
            pending.spawn(async move {
                RpcGateway::connect(&name, &url, connect_timeout, request_timeout, &cancel).await
            });
        }

        let mut gateways = BTreeMap::new();
        while let Some(joined) = pending.join_next().await {
            let gateway = joined.map_err(|e| BlockchainError::Connection {
                endpoint: "<unknown>".to_string(),
                reason: format!("connect task failed: {e}"),
            })??;
            gateways.insert(gateway.name().to_string(), Arc::new(gateway));
        }

        tracing::info!(endpoints = gateways.len(), "Gateway registry ready");
        Ok(Self { gateways })
    }

    /// Gateway for the endpoint called `name`.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ChainGateway>> {
        self.gateways
            .get(name)
            .map(|g| Arc::clone(g) as Arc<dyn ChainGateway>)
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }

    /// Tear the registry down. Outstanding clones stay usable until dropped.
    pub fn close(self) {
        for name in self.gateways.keys() {
            tracing::debug!(endpoint = %name, "Closing chain gateway");
        }
        tracing::info!(endpoints = self.gateways.len(), "Gateway registry closed");
    }
}
