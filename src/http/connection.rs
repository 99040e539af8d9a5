use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::http::envelope::ApiEnvelope;
use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::AppContext;

/// Idle deadline for reading one full request.
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Handles one accepted TCP connection: owns the socket and read buffer for
/// its entire lifetime and runs the read -> route -> write cycle until the
/// peer goes away or keep-alive ends.
pub struct Connection {
    stream: TcpStream,
    buffer: BytesMut,
    ctx: Arc<AppContext>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Routing(Request),
    Writing(Response),
    Closing,
    Closed,
}

/// Outcome of trying to read one request off the wire.
enum ReadOutcome {
    Request(Request),
    /// Peer closed the connection cleanly
    Eof,
    /// Bytes arrived but do not form a valid request
    Malformed(ParseError),
}

impl Connection {
    pub fn new(stream: TcpStream, ctx: Arc<AppContext>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            ctx,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    match tokio::time::timeout(IDLE_TIMEOUT, self.read_request()).await {
                        Ok(Ok(ReadOutcome::Request(req))) => {
                            self.state = ConnectionState::Routing(req);
                        }
                        Ok(Ok(ReadOutcome::Eof)) => {
                            self.state = ConnectionState::Closing;
                        }
                        Ok(Ok(ReadOutcome::Malformed(e))) => {
                            // Protocol error: answer 400, then close. The
                            // buffer may hold garbage, so the connection is
                            // not safe to keep alive.
                            warn!("HTTP parse error: {:?}", e);
                            let response = ApiEnvelope::error(
                                400,
                                "Malformed HTTP request.",
                                "Bad Request",
                            )
                            .into_response(StatusCode::BadRequest, false);
                            self.state = ConnectionState::Writing(response);
                        }
                        Ok(Err(e)) => {
                            debug!("Read error: {}", e);
                            self.state = ConnectionState::Closing;
                        }
                        Err(_) => {
                            debug!("Idle timeout expired, closing connection");
                            self.state = ConnectionState::Closing;
                        }
                    }
                }

                ConnectionState::Routing(req) => {
                    let ctx = self.ctx.clone();
                    let response = ctx.router.dispatch(req, &ctx).await;
                    self.state = ConnectionState::Writing(response);
                }

                ConnectionState::Writing(response) => {
                    let keep_alive = response.keep_alive;
                    let writer = ResponseWriter::new(response);

                    match writer.write_to_stream(&mut self.stream).await {
                        Ok(()) if keep_alive => {
                            self.state = ConnectionState::Reading;
                        }
                        Ok(()) => {
                            self.state = ConnectionState::Closing;
                        }
                        Err(e) => {
                            debug!("Write error: {}", e);
                            self.state = ConnectionState::Closing;
                        }
                    }
                }

                ConnectionState::Closing => {
                    // Half-close: shut down the send direction and let the
                    // socket drop.
                    let _ = self.stream.shutdown().await;
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    async fn read_request(&mut self) -> anyhow::Result<ReadOutcome> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    // Remove consumed bytes
                    let _ = self.buffer.split_to(consumed);
                    return Ok(ReadOutcome::Request(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data -> fall through to read
                }

                Err(e) => {
                    return Ok(ReadOutcome::Malformed(e));
                }
            }

            let n = self.stream.read_buf(&mut self.buffer).await?;

            if n == 0 {
                // Client closed connection
                return Ok(ReadOutcome::Eof);
            }
        }
    }
}
