// src/mailbox/imap.rs
//! IMAP over implicit TLS (port 993) via async-imap + rustls.

use anyhow::{Context, Result};
use async_imap::imap_proto::{Response, Status};
use async_imap::Session;
use futures::TryStreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::{self, pki_types::ServerName};
use tokio_rustls::TlsConnector;

use super::{MailSession, MailboxConnector};
use crate::config::Credentials;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

pub struct ImapConnector {
    host: String,
    port: u16,
}

impl ImapConnector {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    fn tls_connector() -> Result<TlsConnector> {
        let mut roots = rustls::RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = rustls::ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_safe_default_protocol_versions()
        .context("rustls protocol versions")?
        .with_root_certificates(roots)
        .with_no_client_auth();
        Ok(TlsConnector::from(Arc::new(config)))
    }
}

#[async_trait::async_trait]
impl MailboxConnector for ImapConnector {
    async fn open(&self, credentials: &Credentials) -> Result<Box<dyn MailSession>> {
        let tcp = tokio::time::timeout(
            CONNECT_TIMEOUT,
            TcpStream::connect((self.host.as_str(), self.port)),
        )
        .await
        .with_context(|| format!("imap connect to {}:{} timed out", self.host, self.port))?
        .with_context(|| format!("imap connect to {}:{}", self.host, self.port))?;

        let server_name =
            ServerName::try_from(self.host.clone()).context("invalid imap host name")?;
        let tls = tokio::time::timeout(
            CONNECT_TIMEOUT,
            Self::tls_connector()?.connect(server_name, tcp),
        )
        .await
        .context("imap tls handshake timed out")?
        .context("imap tls handshake")?;

        let mut client = async_imap::Client::new(tls);
        // Server greeting must be consumed before the first command.
        let greeting = client
            .read_response()
            .await
            .context("imap greeting: connection closed")?
            .context("imap greeting")?;
        check_greeting(greeting.parsed()).context("imap greeting")?;

        let session = client
            .login(&credentials.user, &credentials.password)
            .await
            .map_err(|(e, _client)| e)
            .context("imap login")?;

        tracing::debug!(host = %self.host, user = %credentials.user, "imap session opened");
        Ok(Box::new(ImapSession { inner: session }))
    }
}

/// `* OK` or `* PREAUTH` opens the session; `* BYE` and anything else refuse it.
fn check_greeting(resp: &Response<'_>) -> Result<()> {
    match resp {
        Response::Data {
            status: Status::Ok | Status::PreAuth,
            ..
        } => Ok(()),
        Response::Data {
            status,
            information,
            ..
        } => Err(anyhow::anyhow!(
            "server refused connection ({status:?}): {}",
            information.as_deref().unwrap_or("")
        )),
        other => Err(anyhow::anyhow!("unexpected greeting {other:?}")),
    }
}

pub struct ImapSession {
    inner: Session<TlsStream<TcpStream>>,
}

#[async_trait::async_trait]
impl MailSession for ImapSession {
    async fn select_inbox(&mut self) -> Result<()> {
        self.inner.select("INBOX").await.context("imap select INBOX")?;
        Ok(())
    }

    async fn search(&mut self, query: &str) -> Result<Vec<u32>> {
        let found = self
            .inner
            .search(query)
            .await
            .with_context(|| format!("imap search {query}"))?;
        // Sequence numbers grow with arrival order.
        let mut ids: Vec<u32> = found.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn fetch_message(&mut self, id: u32) -> Result<Option<Vec<u8>>> {
        let fetches: Vec<_> = self
            .inner
            .fetch(id.to_string(), "RFC822")
            .await
            .with_context(|| format!("imap fetch {id}"))?
            .try_collect()
            .await
            .with_context(|| format!("imap fetch {id} stream"))?;
        Ok(fetches.iter().find_map(|f| f.body().map(<[u8]>::to_vec)))
    }

    async fn logout(&mut self) -> Result<()> {
        self.inner.logout().await.context("imap logout")?;
        Ok(())
    }
}
