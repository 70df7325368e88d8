//! The request/response boundary to the board management service. Transports only move
//! requests and replies, judging a reply (response codes, missing data) is left to the caller.

pub mod mock;
pub mod nextjtag;

use crate::axi::{
    ResponseStatus,
    Transaction,
};
use kstring::KString;
use thiserror::Error;

pub type TransportResult<T> = Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error from the NextJTAG client")]
    NextJtag(#[from] njclient::Error),
    #[error("No boards are attached to the server")]
    NoBoards,
    #[error("No board with key `{0}`")]
    MissingBoard(KString),
    #[error("No FPGA at index {index} on board `{board}` ({count} found)")]
    MissingFpga {
        board: KString,
        index: usize,
        count: usize,
    },
    #[error("failed to get an axi handle")]
    NoAxiHandle,
    /// Failures of other [`Transport`] implementations
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Version information reported by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub sha1: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub key: KString,
    pub name: Option<String>,
}

impl Board {
    /// Pick the board with `key`, or any board when `key` is `None`
    /// # Errors
    /// Returns an error if no such board was reported
    pub fn select(boards: Vec<Board>, key: Option<&str>) -> TransportResult<Self> {
        match key {
            None => boards.into_iter().next().ok_or(Error::NoBoards),
            Some(key) => boards
                .into_iter()
                .find(|b| b.key.as_str() == key)
                .ok_or_else(|| Error::MissingBoard(KString::from_ref(key))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fpga {
    pub board: KString,
    pub index: usize,
    pub name: Option<String>,
}

impl Fpga {
    /// Pick the FPGA at chain position `index`
    /// # Errors
    /// Returns an error if the board has no FPGA there
    pub fn select(fpgas: Vec<Fpga>, board: &Board, index: usize) -> TransportResult<Self> {
        let count = fpgas.len();
        fpgas
            .into_iter()
            .find(|f| f.index == index)
            .ok_or_else(|| Error::MissingFpga {
                board: board.key.clone(),
                index,
                count,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxiHandle {
    pub board: KString,
    pub fpga: usize,
    pub id: u32,
    pub available: bool,
}

impl AxiHandle {
    /// # Errors
    /// Returns [`Error::NoAxiHandle`] if every handle is taken
    pub fn first_available(handles: Vec<AxiHandle>) -> TransportResult<Self> {
        handles
            .into_iter()
            .find(|h| h.available)
            .ok_or(Error::NoAxiHandle)
    }
}

/// What came back from an issued transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    /// The raw response code string
    pub response: String,
    /// Read data, if any was returned
    pub value: Option<Vec<u32>>,
}

impl TransactionResult {
    #[must_use]
    pub fn status(&self) -> ResponseStatus {
        match self.response.parse::<ResponseStatus>() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

/// The trait implemented by the ways of reaching a board management service.
///
/// Calls are blocking and made in the order: version, boards, init, FPGAs, AXI handles,
/// transaction.
pub trait Transport {
    /// Gets the version of the connected service, also serving as a connectivity check
    fn server_version(&mut self) -> TransportResult<ServerVersion>;

    /// Lists the boards the service can see
    fn query_boards(&mut self) -> TransportResult<Vec<Board>>;

    /// Initialize `board`, required before its FPGAs can be queried
    fn init_board(&mut self, board: &Board) -> TransportResult<()>;

    /// Lists the FPGAs on an initialized board
    fn query_fpgas(&mut self, board: &Board) -> TransportResult<Vec<Fpga>>;

    /// Lists the AXI handles of `fpga`
    fn axi_handles(&mut self, fpga: &Fpga) -> TransportResult<Vec<AxiHandle>>;

    /// Issue `transaction` on `handle` and wait for the response
    fn issue_transaction(
        &mut self,
        handle: &AxiHandle,
        transaction: &Transaction,
    ) -> TransportResult<TransactionResult>;
}
