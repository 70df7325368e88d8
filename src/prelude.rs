//! Prelude (helpful reexports) for this package

pub use crate::{
    axi::{
        CacheAttributes,
        Request,
        Transaction,
        TransactionOptions,
    },
    dump::HexDump,
    session::{
        Outcome,
        Target,
    },
    transport::{
        nextjtag::{
            self,
            NextJtag,
        },
        Transport,
    },
    Error,
};
pub use njclient::Config;
