//! The errors that end a run. None of these are recovered from.

use crate::{
    axi::ResponseStatus,
    transport,
};
use thiserror::Error;

/// Bad user-facing size parameters, caught before (or instead of) rendering
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("sorry, only supporting write lengths of 4/8 bytes (got {0})")]
    WriteSize(u64),
    #[error("column_size provided not supported: {0}. Options: 1,2,4,8")]
    ColumnSize(u64),
    #[error("num_columns must be at least 1")]
    NoColumns,
    #[error("read data of {bytes} bytes does not split into {width} byte columns")]
    PartialElement { bytes: usize, width: usize },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("address {addr:#x} must be aligned to access size: {grain} bytes")]
    Alignment { addr: u64, grain: u64 },
    #[error("unable to {action}")]
    Service {
        action: String,
        #[source]
        source: transport::Error,
    },
    #[error("failed to create {0}")]
    Construction(&'static str),
    #[error("Axi transaction failed")]
    Dispatch(#[source] transport::Error),
    #[error("received error from hardware, {0}")]
    Hardware(ResponseStatus),
    #[error("failed to extract read data")]
    Extraction,
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl Error {
    pub(crate) fn service(action: impl Into<String>) -> impl FnOnce(transport::Error) -> Self {
        let action = action.into();
        move |source| Self::Service { action, source }
    }
}
