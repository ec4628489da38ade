//! Serve command - run the HTTP upload endpoint

use anyhow::{Context, Result};

use tally_core::adapters::http;
use tally_core::services::EntryPoint;

use super::{get_context, load_config};
use crate::output;

pub fn run(bind: Option<String>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    let ctx = get_context(config, EntryPoint::Server)?;
    let addr = ctx.config.server.bind.clone();

    output::info(&format!(
        "Serving POST http://{}{} (ctrl-c to stop)",
        addr,
        http::ANALYTICS_ROUTE
    ));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(http::bind_and_serve(&addr, ctx.analytics_service))
}
