//! Drive one transaction through a [`Transport`], from the version check to the validated
//! response.

use crate::{
    axi::Transaction,
    error::Error,
    transport::{
        AxiHandle,
        Board,
        Fpga,
        Transport,
    },
};
use tracing::{
    debug,
    info,
};

/// Which FPGA to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Target<'a> {
    /// Board key, `None` takes whichever board the service lists first
    pub board: Option<&'a str>,
    /// FPGA index on that board
    pub fpga: usize,
}

/// A successful transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The words returned by a read
    Read(Vec<u32>),
    Written,
}

/// Walk the service from the version check down to an available AXI handle on `target`
/// # Errors
/// Returns [`Error::Service`] naming the step that failed
pub fn open<T>(transport: &mut T, target: &Target<'_>) -> Result<AxiHandle, Error>
where
    T: Transport,
{
    let version = transport
        .server_version()
        .map_err(Error::service("get version"))?;
    debug!(
        major = version.major,
        minor = version.minor,
        sha1 = version.sha1.as_str(),
        version = version.version.as_str(),
        "Server version"
    );

    let boards = transport
        .query_boards()
        .map_err(Error::service("query boards"))?;
    let board = Board::select(boards, target.board).map_err(Error::service("select a board"))?;
    info!(key = board.key.as_str(), "Using board");
    transport
        .init_board(&board)
        .map_err(Error::service(format!(
            "initialize board with key {}",
            board.key
        )))?;

    let fpgas = transport
        .query_fpgas(&board)
        .map_err(Error::service(format!("query fpgas for board {}", board.key)))?;
    let fpga =
        Fpga::select(fpgas, &board, target.fpga).map_err(Error::service("select the fpga"))?;
    info!(index = fpga.index, name = ?fpga.name, "Using FPGA");

    let handles = transport
        .axi_handles(&fpga)
        .map_err(Error::service("query axi handles"))?;
    let handle = AxiHandle::first_available(handles).map_err(Error::service("reserve axi"))?;
    debug!(id = handle.id, "Acquired AXI handle");
    Ok(handle)
}

/// Issue `transaction` on `handle` and judge the response. Anything but `OKAY`/`EXOKAY` is an
/// error, and so is a successful read that carries no data.
/// # Errors
/// Returns [`Error::Dispatch`], [`Error::Hardware`], or [`Error::Extraction`]
pub fn issue<T>(
    transport: &mut T,
    handle: &AxiHandle,
    transaction: &Transaction,
) -> Result<Outcome, Error>
where
    T: Transport,
{
    let result = transport
        .issue_transaction(handle, transaction)
        .map_err(Error::Dispatch)?;
    let status = result.status();
    debug!(%status, "Transaction complete");
    if !status.is_success() {
        return Err(Error::Hardware(status));
    }
    if transaction.is_read() {
        result.value.map(Outcome::Read).ok_or(Error::Extraction)
    } else {
        Ok(Outcome::Written)
    }
}

/// [`open`] then [`issue`]
/// # Errors
/// Returns the first failure of either
pub fn run<T>(
    transport: &mut T,
    target: &Target<'_>,
    transaction: &Transaction,
) -> Result<Outcome, Error>
where
    T: Transport,
{
    let handle = open(transport, target)?;
    issue(transport, &handle, transaction)
}
