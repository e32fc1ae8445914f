//! Run the HTTP gateway.

use tokio::runtime::Runtime;

use crate::cddb::Gateway;
use crate::cddb::format::ServerInfo;
use crate::config::Config;
use crate::server;
use crate::store::postgres::PgStore;

/// Connect to the metadata database and serve until shutdown.
pub fn cmd_serve(rt: &Runtime, config: &Config) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = PgStore::connect(&config.database).await?;
        let gateway = Gateway::new(store, ServerInfo::from(&config.server));

        tracing::info!(
            name = %config.server.name,
            port = config.server.port,
            "Starting freedb-gateway"
        );
        server::serve(gateway, &config.server.listen).await?;
        Ok(())
    })
}
