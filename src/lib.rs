//! Issue single AXI transactions against FPGAs managed by a NextJTAG board service and render
//! read data as hex dumps.
//!
//! A run is strictly linear: [`axi::Request::build`] validates and assembles the
//! [`axi::Transaction`], [`session::run`] carries it through a [`transport::Transport`], and
//! [`dump::HexDump`] renders whatever a read returned. Every failure is an [`Error`] and ends the
//! run.

pub mod axi;
pub mod dump;
pub mod error;
pub mod prelude;
pub mod session;
pub mod transport;

pub use error::{
    Error,
    FormatError,
};
