/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! ISO 8583 Echo Server Example
//!
//! Answers network management requests with their response type and approves
//! every authorization or financial request.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info};

use ironiso_core::{Direction, IsoMessage, MessageClass};
use ironiso_engine::{ClientBuilder, MessageListener, NetworkEchoListener};
use ironiso_schema::ProtocolSchema;
use ironiso_transport::{ChannelSink, IsoFrameCodec, write_frames};

mod common;
use common::{ExampleConfig, init_logging, log_fields, protocol};

/// Approves authorization and financial requests.
struct ApprovingListener;

#[async_trait]
impl MessageListener for ApprovingListener {
    fn name(&self) -> &str {
        "approve-all"
    }

    fn is_applicable(&self, message: &IsoMessage) -> bool {
        matches!(
            message.mti().class(),
            Some(MessageClass::Authorization | MessageClass::Financial)
        ) && message.is_request()
    }

    async fn on_message(&self, message: &IsoMessage) -> Option<IsoMessage> {
        log_fields("Request", message);
        let mut reply = message.clone().with_direction(Direction::Outbound);
        reply.set_response_type().ok()?;
        let stan = message.text(11).unwrap_or("000000");
        reply.set_text(38, stan.to_string()).ok()?;
        reply.set_text(39, "00").ok()?;
        Some(reply)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cfg = ExampleConfig::from_env();
    let schema = protocol()?;
    info!("Starting ISO 8583 echo server on {}", cfg.addr());

    let listener = TcpListener::bind(&cfg.addr()).await?;
    loop {
        let (socket, addr) = listener.accept().await?;
        info!("Connection from {}", addr);
        let schema = Arc::clone(&schema);
        tokio::spawn(async move {
            if let Err(e) = handle(socket, schema, addr.to_string()).await {
                error!("Error: {}", e);
            }
        });
    }
}

async fn handle(socket: TcpStream, schema: Arc<ProtocolSchema>, peer: String) -> anyhow::Result<()> {
    let (reader, writer) = socket.into_split();
    let (sink, frames) = ChannelSink::channel(64);
    let codec = IsoFrameCodec::from_schema(&schema);

    let server = ClientBuilder::new(schema)
        .name(peer)
        .add_listener(Arc::new(NetworkEchoListener))
        .add_listener(Arc::new(ApprovingListener))
        .build(sink)?;

    let writer_task = tokio::spawn(write_frames(frames, writer, codec));
    server.run_reader(reader).await?;
    drop(server);
    writer_task.await??;
    Ok(())
}
