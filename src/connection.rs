use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use uuid::Uuid;

use crate::codec::{self, BatchCodec};
use crate::response::Line;

pub struct Connection {
    pub id: Uuid,
    pub client_address: SocketAddr,
    // Data is read from the socket into the codec's read buffer. When a batch is decoded the
    // corresponding bytes are removed from the buffer.
    framed: Framed<TcpStream, BatchCodec>,
}

impl Connection {
    pub fn new(stream: TcpStream, client_address: SocketAddr, max_batch_size: usize) -> Connection {
        Connection {
            id: Uuid::new_v4(),
            client_address,
            framed: Framed::new(stream, BatchCodec::new(max_batch_size)),
        }
    }

    /// Reads the next batch of command lines. `None` means the client hung up.
    pub async fn read_batch(&mut self) -> Result<Option<String>, codec::Error> {
        self.framed.next().await.transpose()
    }

    /// Writes `lines` and flushes them to the socket.
    pub async fn write_lines(&mut self, lines: Vec<Line>) -> Result<(), codec::Error> {
        for line in lines {
            self.framed.feed(line).await?;
        }
        self.framed.flush().await
    }
}
