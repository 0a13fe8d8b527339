use super::MailTransport;
use crate::core::{BalerError, BalerResult};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// Plain SMTP delivery, one connection per message
///
/// Speaks just enough of RFC 5321 to hand a message to a relay: no TLS, no
/// authentication.
#[derive(Debug, Clone)]
pub struct SmtpTransport {
    server: String,
    port: u16,
    helo: String,
}

impl SmtpTransport {
    pub fn new(server: impl Into<String>, port: u16) -> Self {
        Self {
            server: server.into(),
            port,
            helo: "localhost".to_string(),
        }
    }
}

#[async_trait]
impl MailTransport for SmtpTransport {
    async fn deliver(&self, from: &str, to: &str, message: &str) -> BalerResult<()> {
        let stream = TcpStream::connect((self.server.as_str(), self.port))
            .await
            .map_err(|e| {
                BalerError::Mail(format!(
                    "could not connect to {}:{}: {}",
                    self.server, self.port, e
                ))
            })?;
        let (read, write) = stream.into_split();
        let mut session = Session {
            reader: BufReader::new(read),
            writer: write,
        };

        session.expect(220).await?;
        session.command(&format!("HELO {}", self.helo), 250).await?;
        session.command(&format!("MAIL FROM:<{}>", from), 250).await?;
        session.command(&format!("RCPT TO:<{}>", to), 250).await?;
        session.command("DATA", 354).await?;
        session.send_data(message).await?;
        session.expect(250).await?;
        // The message is accepted at this point
        if let Err(e) = session.command("QUIT", 221).await {
            tracing::debug!(error = %e, "SMTP QUIT was not acknowledged");
        }

        Ok(())
    }
}

struct Session {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Session {
    async fn command(&mut self, line: &str, code: u16) -> BalerResult<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        self.expect(code).await
    }

    async fn send_data(&mut self, message: &str) -> BalerResult<()> {
        self.writer.write_all(dot_stuff(message).as_bytes()).await?;
        self.writer.write_all(b".\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Read one (possibly multi-line) reply and check its code
    async fn expect(&mut self, code: u16) -> BalerResult<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line).await? == 0 {
                return Err(BalerError::Mail(
                    "SMTP server closed the connection".to_string(),
                ));
            }
            // "250-..." continues, "250 ..." ends the reply
            if line.as_bytes().get(3) != Some(&b'-') {
                break;
            }
        }

        let reply = line.trim_end();
        match reply.get(..3).and_then(|c| c.parse::<u16>().ok()) {
            Some(got) if got == code => Ok(()),
            _ => Err(BalerError::Mail(format!(
                "expected SMTP {} but server replied '{}'",
                code, reply
            ))),
        }
    }
}

/// CRLF line endings with leading dots doubled, ending in CRLF
fn dot_stuff(message: &str) -> String {
    let mut out = String::with_capacity(message.len() + 16);
    for line in message.lines() {
        if line.starts_with('.') {
            out.push('.');
        }
        out.push_str(line);
        out.push_str("\r\n");
    }
    out
}
