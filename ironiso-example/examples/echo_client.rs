/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! ISO 8583 Echo Client Example
//!
//! Sends a network echo and a batch of concurrent purchases over one
//! connection, then waits for each response by correlation key.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{error, info, warn};

use ironiso_core::IsoMessage;
use ironiso_engine::{ClientBuilder, IsoClient};
use ironiso_transport::{ChannelSink, IsoFrameCodec, write_frames};

mod common;
use common::{ExampleConfig, init_logging, log_fields, protocol, transmission_time};

const PURCHASES: usize = 5;

fn echo(client: &IsoClient<ChannelSink>, cfg: &ExampleConfig) -> ironiso_core::Result<IsoMessage> {
    let mut msg = IsoMessage::new("0800".parse()?);
    msg.set_text(7, transmission_time())?;
    msg.set_text(11, client.next_stan().format().as_str())?;
    msg.set_text(41, cfg.terminal_id.as_str())?;
    msg.set_text(70, "301")?;
    Ok(msg)
}

fn purchase(
    client: &IsoClient<ChannelSink>,
    cfg: &ExampleConfig,
    amount: u64,
) -> ironiso_core::Result<IsoMessage> {
    let mut msg = IsoMessage::new("0200".parse()?);
    msg.set_text(2, "4111111111111111")?;
    msg.set_text(3, "000000")?;
    msg.set_text(4, format!("{amount:012}"))?;
    msg.set_text(7, transmission_time())?;
    msg.set_text(11, client.next_stan().format().as_str())?;
    msg.set_text(41, cfg.terminal_id.as_str())?;
    msg.set_text(49, "978")?;
    Ok(msg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::from_env();
    let schema = protocol()?;
    info!("Connecting to {}", cfg.addr());

    let socket = TcpStream::connect(&cfg.addr()).await?;
    let (reader, writer) = socket.into_split();
    let (sink, frames) = ChannelSink::channel(64);
    tokio::spawn(write_frames(frames, writer, IsoFrameCodec::from_schema(&schema)));

    let client = Arc::new(
        ClientBuilder::new(schema)
            .name("echo-client")
            .request_timeout(Duration::from_secs(10))
            .build(sink)?,
    );

    let inbound = Arc::clone(&client);
    tokio::spawn(async move {
        if let Err(e) = inbound.run_reader(reader).await {
            error!("Reader stopped: {}", e);
        }
    });

    let response = client.send(&echo(&client, &cfg)?).await?;
    log_fields("Echo response", &response);

    let mut pending = Vec::with_capacity(PURCHASES);
    for i in 0..PURCHASES {
        let amount = 1000 * (i as u64 + 1);
        pending.push(client.send_future(&purchase(&client, &cfg, amount)?).await?);
    }

    for handle in pending {
        match handle.wait().await {
            Ok(response) => info!(
                "{} stan {} approved with {}",
                response.mti(),
                response.text(11).unwrap_or("?"),
                response.text(39).unwrap_or("??")
            ),
            Err(e) => warn!("Purchase failed: {}", e),
        }
    }

    info!("Done, {} requests still pending", client.registry().len());
    Ok(())
}
