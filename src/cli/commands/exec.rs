//! Answer one protocol command from the shell.

use std::io::Write;
use tokio::runtime::Runtime;

use crate::cddb::Gateway;
use crate::cddb::format::ServerInfo;
use crate::config::Config;
use crate::error::ResultExt;
use crate::store::postgres::PgStore;

/// Run `cmd` at protocol level `proto` and print the raw response.
pub fn cmd_exec(rt: &Runtime, config: &Config, cmd: &str, proto: &str) -> anyhow::Result<()> {
    rt.block_on(async {
        let store = PgStore::connect(&config.database).await?;
        let gateway = Gateway::new(store, ServerInfo::from(&config.server));

        let response = gateway
            .respond(Some(cmd), Some(proto))
            .await
            .with_context(format!("answering {:?}", cmd))?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(response.render().as_bytes())?;
        stdout.flush()?;
        Ok(())
    })
}
