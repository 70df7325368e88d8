//! Mock transport implementations used in testing the interface

use super::{
    AxiHandle,
    Board,
    Error,
    Fpga,
    ServerVersion,
    TransactionResult,
    Transport,
    TransportResult,
};
use anyhow::anyhow;
use crate::axi::{
    Operation,
    Transaction,
    BEAT_BYTES,
};
use kstring::KString;
use std::collections::HashMap;

/// Service calls that a [`Mock`] can be told to fail
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    Version,
    QueryBoards,
    InitBoard,
    QueryFpgas,
    AxiHandles,
    Issue,
}

/// A service that mocks boards and AXI memory, useful for testing
#[derive(Debug, Default)]
pub struct Mock {
    /// Board key and the number of FPGAs on it
    boards: Vec<(KString, usize)>,
    /// Word addressed memory, unset words read back as zero
    memory: HashMap<u64, u32>,
    response: Option<String>,
    drop_read_data: bool,
    busy_handles: bool,
    fail_at: Option<Stage>,
    initialized: Vec<KString>,
    issued: Vec<Transaction>,
}

impl Mock {
    /// Construct a new mock service by providing `(board key, number of FPGAs)` pairs
    #[must_use]
    pub fn new(boards: &[(&str, usize)]) -> Self {
        Self {
            boards: boards
                .iter()
                .map(|(key, n)| (KString::from_ref(key), *n))
                .collect(),
            ..Self::default()
        }
    }

    /// Preload consecutive words starting at `addr`. Words past the top of the address space are
    /// dropped.
    #[must_use]
    pub fn with_memory(mut self, addr: u64, words: &[u32]) -> Self {
        for (i, word) in words.iter().enumerate() {
            if let Some(at) = beat_offset(addr, i) {
                self.memory.insert(at, *word);
            }
        }
        self
    }

    /// Answer every transaction with `code` instead of `OKAY`
    #[must_use]
    pub fn with_response(mut self, code: &str) -> Self {
        self.response = Some(code.to_owned());
        self
    }

    /// Successful reads come back without data
    #[must_use]
    pub fn without_read_data(mut self) -> Self {
        self.drop_read_data = true;
        self
    }

    /// Every AXI handle is owned by someone else
    #[must_use]
    pub fn with_busy_handles(mut self) -> Self {
        self.busy_handles = true;
        self
    }

    #[must_use]
    pub fn failing_at(mut self, stage: Stage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// The word currently stored at `addr`
    #[must_use]
    pub fn peek(&self, addr: u64) -> u32 {
        self.memory.get(&addr).copied().unwrap_or_default()
    }

    /// Every transaction issued so far
    #[must_use]
    pub fn issued(&self) -> &[Transaction] {
        &self.issued
    }

    /// Keys of every board initialized so far
    #[must_use]
    pub fn initialized(&self) -> &[KString] {
        &self.initialized
    }

    fn check(&self, stage: Stage) -> TransportResult<()> {
        if self.fail_at == Some(stage) {
            return Err(anyhow!("Injected failure at {stage:?}").into());
        }
        Ok(())
    }

    fn fpga_count(&self, key: &str) -> TransportResult<usize> {
        self.boards
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, n)| *n)
            .ok_or_else(|| Error::MissingBoard(KString::from_ref(key)))
    }
}

/// Address of beat `i` of an incrementing burst from `addr`
fn beat_offset(addr: u64, i: usize) -> Option<u64> {
    u64::try_from(i)
        .ok()
        .and_then(|i| i.checked_mul(BEAT_BYTES))
        .and_then(|offset| addr.checked_add(offset))
}

impl Transport for Mock {
    fn server_version(&mut self) -> TransportResult<ServerVersion> {
        self.check(Stage::Version)?;
        Ok(ServerVersion {
            major: 1,
            minor: 0,
            sha1: "0000000".to_owned(),
            version: "1.0.0-mock".to_owned(),
        })
    }

    fn query_boards(&mut self) -> TransportResult<Vec<Board>> {
        self.check(Stage::QueryBoards)?;
        Ok(self
            .boards
            .iter()
            .map(|(key, _)| Board {
                key: key.clone(),
                name: None,
            })
            .collect())
    }

    fn init_board(&mut self, board: &Board) -> TransportResult<()> {
        self.check(Stage::InitBoard)?;
        self.fpga_count(&board.key)?;
        self.initialized.push(board.key.clone());
        Ok(())
    }

    fn query_fpgas(&mut self, board: &Board) -> TransportResult<Vec<Fpga>> {
        self.check(Stage::QueryFpgas)?;
        if !self.initialized.contains(&board.key) {
            return Err(anyhow!("Board `{}` queried before init", board.key).into());
        }
        let n = self.fpga_count(&board.key)?;
        Ok((0..n)
            .map(|index| Fpga {
                board: board.key.clone(),
                index,
                name: None,
            })
            .collect())
    }

    fn axi_handles(&mut self, fpga: &Fpga) -> TransportResult<Vec<AxiHandle>> {
        self.check(Stage::AxiHandles)?;
        Ok((0..2)
            .map(|id| AxiHandle {
                board: fpga.board.clone(),
                fpga: fpga.index,
                id,
                available: !self.busy_handles,
            })
            .collect())
    }

    fn issue_transaction(
        &mut self,
        _handle: &AxiHandle,
        transaction: &Transaction,
    ) -> TransportResult<TransactionResult> {
        self.check(Stage::Issue)?;
        self.issued.push(transaction.clone());
        let response = self.response.clone().unwrap_or_else(|| "OKAY".to_owned());
        let okay = response == "OKAY" || response == "EXOKAY";
        let opts = transaction.options();
        let beat_addr = |i: usize| -> TransportResult<u64> {
            if opts.incrementing() {
                beat_offset(transaction.addr(), i)
                    .ok_or_else(|| anyhow!("Burst runs past the top of the address space").into())
            } else {
                Ok(transaction.addr())
            }
        };
        let value = match transaction.op() {
            Operation::Read => {
                let words = (0..opts.count())
                    .map(|i| beat_addr(i).map(|at| self.peek(at)))
                    .collect::<TransportResult<Vec<u32>>>()?;
                (okay && !self.drop_read_data).then_some(words)
            }
            Operation::Write(data) => {
                let addrs = (0..data.len())
                    .map(beat_addr)
                    .collect::<TransportResult<Vec<u64>>>()?;
                if okay {
                    self.memory.extend(addrs.into_iter().zip(data.iter().copied()));
                }
                None
            }
        };
        Ok(TransactionResult { response, value })
    }
}
