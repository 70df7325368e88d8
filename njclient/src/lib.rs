//! A blocking client for the NextJTAG board management REST API.
//!
//! Every call is a single request/response round trip. Paths are rooted at
//! `{uri}/api/{api_version}`:
//!
//! - `GET  version`
//! - `GET  boards`
//! - `POST boards/{key}/init`
//! - `GET  boards/{key}/fpgas`
//! - `GET  boards/{key}/fpgas/{index}/axi`
//! - `POST boards/{key}/fpgas/{index}/axi/{handle}/transaction`

pub mod wire;

use serde::{
    de::DeserializeOwned,
    Serialize,
};
use std::time::Duration;
use tracing::{
    debug,
    trace,
};
use wire::{
    AxiHandleInfo,
    AxiTransaction,
    BoardInfo,
    FpgaInfo,
    ServerVersion,
    TransactionResponse,
};

const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can be thrown from service interactions
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP request failed")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status} for `{path}`: {body}")]
    Status {
        status: u16,
        path: String,
        body: String,
    },
    #[error("Malformed response body from `{path}`")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// The REST API version path segment
    pub api_version: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_owned(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// A connection to a board management server
#[derive(Debug)]
pub struct Client {
    http: reqwest::blocking::Client,
    base: String,
}

impl Client {
    /// Create a client for the server at `uri`
    /// # Errors
    /// Returns an error if the underlying HTTP client can't be constructed
    pub fn new(config: &Config, uri: &str) -> Result<Self, Error> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let base = format!("{}/api/{}", uri.trim_end_matches('/'), config.api_version);
        Ok(Self { http, base })
    }

    /// The root all request paths are joined onto
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }

    fn finish(path: &str, resp: reqwest::blocking::Response) -> Result<String, Error> {
        let status = resp.status();
        let body = resp.text()?;
        trace!(path, %status, body = body.as_str(), "Response");
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                path: path.to_owned(),
                body,
            });
        }
        Ok(body)
    }

    fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, Error> {
        serde_json::from_str(body).map_err(|source| Error::Json {
            path: path.to_owned(),
            source,
        })
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        debug!(path, "GET");
        let resp = self.http.get(self.url(path)).send()?;
        let body = Self::finish(path, resp)?;
        Self::decode(path, &body)
    }

    fn post<B, T>(&self, path: &str, payload: &B) -> Result<T, Error>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        debug!(path, "POST");
        let resp = self.http.post(self.url(path)).json(payload).send()?;
        let body = Self::finish(path, resp)?;
        Self::decode(path, &body)
    }

    /// Gets the version record of the connected server
    /// # Errors
    /// Returns errors on transport failures
    pub fn server_version(&self) -> Result<ServerVersion, Error> {
        self.get("version")
    }

    /// Lists the boards attached to the server
    /// # Errors
    /// Returns errors on transport failures
    pub fn query_boards(&self) -> Result<Vec<BoardInfo>, Error> {
        self.get("boards")
    }

    /// Scans the JTAG chain of board `key`, which must happen before its FPGAs are queried
    /// # Errors
    /// Returns errors on transport failures
    pub fn init_board(&self, key: &str) -> Result<(), Error> {
        let path = format!("boards/{key}/init");
        debug!(path = path.as_str(), "POST");
        let resp = self.http.post(self.url(&path)).send()?;
        Self::finish(&path, resp)?;
        Ok(())
    }

    /// Lists the FPGAs found on an initialized board
    /// # Errors
    /// Returns errors on transport failures
    pub fn query_fpgas(&self, key: &str) -> Result<Vec<FpgaInfo>, Error> {
        self.get(&format!("boards/{key}/fpgas"))
    }

    /// Lists the AXI handles exposed by FPGA `index` on board `key`
    /// # Errors
    /// Returns errors on transport failures
    pub fn axi_handles(&self, key: &str, index: usize) -> Result<Vec<AxiHandleInfo>, Error> {
        self.get(&format!("boards/{key}/fpgas/{index}/axi"))
    }

    /// Issue a single AXI transaction on `handle`
    /// # Errors
    /// Returns errors on transport failures. A non-`OKAY` response code is *not* an error here.
    pub fn issue_transaction(
        &self,
        key: &str,
        index: usize,
        handle: u32,
        transaction: &AxiTransaction,
    ) -> Result<TransactionResponse, Error> {
        self.post(
            &format!("boards/{key}/fpgas/{index}/axi/{handle}/transaction"),
            transaction,
        )
    }
}
