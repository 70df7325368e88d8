//! JSON bodies exchanged with the board management service

use kstring::KString;
use serde::{
    Deserialize,
    Serialize,
};

/// The version record reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub sha1: String,
    pub version: String,
}

/// A board as reported by a board query
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BoardInfo {
    /// The unique key (serial) of this board
    pub key: KString,
    /// Human readable product name, if the server knows it
    #[serde(default)]
    pub name: Option<String>,
}

/// An FPGA on an initialized board
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FpgaInfo {
    /// Position of this device in the JTAG chain
    pub index: usize,
    #[serde(default)]
    pub name: Option<String>,
}

/// One AXI master port on an FPGA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct AxiHandleInfo {
    pub id: u32,
    /// Whether another client currently owns this handle
    pub available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxiCacheAttributes {
    pub bufferable: bool,
    pub modifiable: bool,
    pub read_alloc: bool,
    pub write_alloc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxiTransactionOptions {
    /// Incrementing (true) or fixed (false) burst
    pub incr_mode: bool,
    /// Number of 32-bit beats
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxiTransaction {
    pub address: u64,
    pub read_not_write: bool,
    pub options: AxiTransactionOptions,
    pub cache_attributes: AxiCacheAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<u32>>,
}

/// The server's reply to an issued transaction
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TransactionResponse {
    /// The AXI response code, i.e. `OKAY`
    pub response: String,
    /// Read data, absent for writes and failed reads
    #[serde(default)]
    pub value: Option<Vec<u32>>,
}
