use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, instrument};

use crate::config::Config;
use crate::connection::Connection;
use crate::context::Context;
use crate::dispatch;
use crate::Error;

pub async fn run(config: Config) -> Result<(), Error> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let ctx = Context::from_config(&config)?;
    info!(
        records = ctx.store.snapshot().records().len(),
        entries = %config.entries.display(),
        "Loaded directory entries"
    );

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

    serve(listener, ctx, config.max_batch_size).await
}

/// Accepts connections on `listener` until accepting fails, one task per connection.
pub async fn serve(listener: TcpListener, ctx: Context, max_batch_size: usize) -> Result<(), Error> {
    info!("ph server listening on {}", listener.local_addr()?);

    loop {
        let (socket, client_address) = listener.accept().await?;
        let ctx = ctx.clone();
        info!("Accepted connection from {:?}", client_address);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, client_address, ctx, max_batch_size).await {
                error!(error = %e, "connection failed");
            }
        });
    }
}

#[instrument(
    name = "connection",
    skip(stream, ctx, max_batch_size),
    fields(connection_id, client_address)
)]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    ctx: Context,
    max_batch_size: usize,
) -> Result<(), Error> {
    let mut conn = Connection::new(stream, client_address, max_batch_size);

    tracing::Span::current()
        .record("connection_id", conn.id.to_string())
        .record("client_address", client_address.to_string());

    while let Some(batch) = conn.read_batch().await? {
        debug!("Received batch from client: {:?}", batch);
        let reply = dispatch::handle_batch(&batch, &ctx);
        debug!("Sending response to client: {:?}", reply.rendered());

        conn.write_lines(reply.lines).await?;

        if reply.close {
            info!("Client asked to close the connection");
            return Ok(());
        }
    }

    info!("Connection closed");
    Ok(())
}
