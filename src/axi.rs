//! AXI transaction types and the routines that build them.
//!
//! Everything here is constructed once per run and handed to a
//! [`Transport`](crate::transport::Transport) by reference, it is never mutated after that.

use crate::error::{
    Error,
    FormatError,
};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use packed_struct::prelude::*;
use std::{
    fmt::Display,
    num::NonZeroUsize,
    str::FromStr,
};
use tracing::debug;

/// Bus transfers are word addressed, so every transaction must start on this grain
pub const ACCESS_GRAIN: u64 = 4;

/// Bytes carried by a single beat
pub const BEAT_BYTES: u64 = 4;

/// Fails if `addr` isn't aligned to [`ACCESS_GRAIN`]
/// # Errors
/// Returns [`Error::Alignment`] on a misaligned address
pub fn check_alignment(addr: u64) -> Result<(), Error> {
    if addr % ACCESS_GRAIN != 0 {
        return Err(Error::Alignment {
            addr,
            grain: ACCESS_GRAIN,
        });
    }
    Ok(())
}

/// The AXI `AxCACHE[3:0]` attributes of a transaction
#[derive(Debug, PackedStruct, Default, Copy, Clone, PartialEq, Eq)]
#[packed_struct(bit_numbering = "lsb0", size_bytes = "1")]
pub struct CacheAttributes {
    #[packed_field(bits = "0")]
    pub bufferable: bool,
    #[packed_field(bits = "1")]
    pub modifiable: bool,
    #[packed_field(bits = "2")]
    pub read_alloc: bool,
    #[packed_field(bits = "3")]
    pub write_alloc: bool,
}

impl CacheAttributes {
    #[must_use]
    pub fn new(bufferable: bool, modifiable: bool, read_alloc: bool, write_alloc: bool) -> Self {
        Self {
            bufferable,
            modifiable,
            read_alloc,
            write_alloc,
        }
    }

    /// Encode into the 4-bit `AxCACHE` signal
    /// # Errors
    /// Returns an error if the attributes can't be packed
    pub fn axcache(&self) -> Result<u8, Error> {
        let [byte] = self
            .pack()
            .map_err(|_| Error::Construction("AxiCacheAttributes"))?;
        Ok(byte)
    }

    /// Decode from an `AxCACHE` value, the upper nibble is ignored
    /// # Errors
    /// Returns an error if the byte can't be unpacked
    pub fn from_axcache(axcache: u8) -> Result<Self, Error> {
        Self::unpack(&[axcache]).map_err(|_| Error::Construction("AxiCacheAttributes"))
    }
}

/// Address behavior across the beats of a burst
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Burst {
    /// The address advances by one beat each transfer
    Incrementing,
    /// Every beat targets the same address
    Fixed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TransactionOptions {
    pub burst: Burst,
    count: NonZeroUsize,
}

impl TransactionOptions {
    /// Options for a transfer of `byte_size` bytes, rounded up to whole beats
    /// # Errors
    /// Returns [`Error::Construction`] if the transfer would have no beats
    pub fn new(incrementing: bool, byte_size: u64) -> Result<Self, Error> {
        let count = usize::try_from(byte_size.div_ceil(BEAT_BYTES))
            .ok()
            .and_then(NonZeroUsize::new)
            .ok_or(Error::Construction("AxiTransactionOptions"))?;
        Ok(Self {
            burst: if incrementing {
                Burst::Incrementing
            } else {
                Burst::Fixed
            },
            count,
        })
    }

    /// Number of beats, never zero
    #[must_use]
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Bytes moved by the whole burst, `count` beats of [`BEAT_BYTES`]
    #[must_use]
    pub fn byte_len(&self) -> usize {
        self.count().saturating_mul(BEAT_BYTES as usize)
    }

    #[must_use]
    pub fn incrementing(&self) -> bool {
        self.burst == Burst::Incrementing
    }
}

/// The immediate write lengths the protocol can carry
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub enum WriteSize {
    Word = 4,
    DoubleWord = 8,
}

/// Split `value` into the little-endian word sequence for a write of `size` bytes
/// # Errors
/// Returns [`FormatError::WriteSize`] for any size other than 4 or 8
#[allow(clippy::cast_possible_truncation)]
pub fn write_payload(value: u64, size: u64) -> Result<Vec<u32>, Error> {
    let size = WriteSize::from_u64(size).ok_or(FormatError::WriteSize(size))?;
    Ok(match size {
        WriteSize::Word => vec![value as u32],
        WriteSize::DoubleWord => vec![value as u32, (value >> 32) as u32],
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Read,
    /// Words to write, lowest address first
    Write(Vec<u32>),
}

/// A single AXI transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    addr: u64,
    op: Operation,
    options: TransactionOptions,
    attributes: CacheAttributes,
}

impl Transaction {
    /// Assemble a transaction. `payload` is required for writes and ignored for reads.
    /// # Errors
    /// Returns an error on a misaligned address or a write without a payload
    pub fn new(
        addr: u64,
        read_not_write: bool,
        options: TransactionOptions,
        attributes: CacheAttributes,
        payload: Option<Vec<u32>>,
    ) -> Result<Self, Error> {
        check_alignment(addr)?;
        let op = if read_not_write {
            Operation::Read
        } else {
            Operation::Write(payload.ok_or(Error::Construction("AxiTransaction"))?)
        };
        Ok(Self {
            addr,
            op,
            options,
            attributes,
        })
    }

    #[must_use]
    pub fn addr(&self) -> u64 {
        self.addr
    }

    #[must_use]
    pub fn op(&self) -> &Operation {
        &self.op
    }

    #[must_use]
    pub fn is_read(&self) -> bool {
        self.op == Operation::Read
    }

    #[must_use]
    pub fn options(&self) -> &TransactionOptions {
        &self.options
    }

    #[must_use]
    pub fn attributes(&self) -> &CacheAttributes {
        &self.attributes
    }

    /// The write words, if this is a write
    #[must_use]
    pub fn data(&self) -> Option<&[u32]> {
        match &self.op {
            Operation::Read => None,
            Operation::Write(data) => Some(data),
        }
    }
}

/// Everything the user asks for, before validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub addr: u64,
    pub read_not_write: bool,
    /// Read length, or the write element size
    pub size: u64,
    pub attributes: CacheAttributes,
    pub incrementing: bool,
    pub write_data: u64,
}

impl Request {
    /// Validate and build the transaction, alignment first
    /// # Errors
    /// Returns the first validation or construction failure
    pub fn build(&self) -> Result<Transaction, Error> {
        check_alignment(self.addr)?;
        let axcache = self.attributes.axcache()?;
        let options = TransactionOptions::new(self.incrementing, self.size)?;
        let payload = if self.read_not_write {
            None
        } else {
            Some(write_payload(self.write_data, self.size)?)
        };
        debug!(
            addr = self.addr,
            axcache,
            count = options.count(),
            read = self.read_not_write,
            "Built transaction"
        );
        Transaction::new(
            self.addr,
            self.read_not_write,
            options,
            self.attributes,
            payload,
        )
    }
}

/// The AXI `xRESP` code returned for a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseStatus {
    Okay,
    ExOkay,
    SlvErr,
    DecErr,
    /// Anything the server reports that isn't an AXI response code
    Other(String),
}

impl ResponseStatus {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Okay | Self::ExOkay)
    }
}

impl FromStr for ResponseStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "OKAY" => Self::Okay,
            "EXOKAY" => Self::ExOkay,
            "SLVERR" => Self::SlvErr,
            "DECERR" => Self::DecErr,
            _ => Self::Other(s.to_owned()),
        })
    }
}

impl Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Okay => "OKAY",
                Self::ExOkay => "EXOKAY",
                Self::SlvErr => "SLVERR",
                Self::DecErr => "DECERR",
                Self::Other(s) => s,
            }
        )
    }
}
