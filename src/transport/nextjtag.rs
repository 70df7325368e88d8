//! The transport implementation for a NextJTAG server, over its REST API
use super::{
    AxiHandle,
    Board,
    Fpga,
    ServerVersion,
    TransactionResult,
    Transport,
    TransportResult,
};
use crate::axi::Transaction;
use njclient::{
    wire,
    Client,
    Config,
};

#[derive(Debug)]
/// A NextJTAG connection (newtype for a [`Client`])
pub struct NextJtag {
    client: Client,
}

impl NextJtag {
    /// Create a transport for the server at `uri`. No request is made until the first call.
    /// # Errors
    /// Will return an error if the HTTP client can't be built
    pub fn connect(uri: &str, config: &Config) -> TransportResult<Self> {
        Ok(Self {
            client: Client::new(config, uri)?,
        })
    }
}

fn to_wire(transaction: &Transaction) -> wire::AxiTransaction {
    let attrs = transaction.attributes();
    wire::AxiTransaction {
        address: transaction.addr(),
        read_not_write: transaction.is_read(),
        options: wire::AxiTransactionOptions {
            incr_mode: transaction.options().incrementing(),
            count: transaction.options().count(),
        },
        cache_attributes: wire::AxiCacheAttributes {
            bufferable: attrs.bufferable,
            modifiable: attrs.modifiable,
            read_alloc: attrs.read_alloc,
            write_alloc: attrs.write_alloc,
        },
        data: transaction.data().map(<[u32]>::to_vec),
    }
}

impl Transport for NextJtag {
    fn server_version(&mut self) -> TransportResult<ServerVersion> {
        let v = self.client.server_version()?;
        Ok(ServerVersion {
            major: v.major,
            minor: v.minor,
            sha1: v.sha1,
            version: v.version,
        })
    }

    fn query_boards(&mut self) -> TransportResult<Vec<Board>> {
        Ok(self
            .client
            .query_boards()?
            .into_iter()
            .map(|b| Board {
                key: b.key,
                name: b.name,
            })
            .collect())
    }

    fn init_board(&mut self, board: &Board) -> TransportResult<()> {
        Ok(self.client.init_board(&board.key)?)
    }

    fn query_fpgas(&mut self, board: &Board) -> TransportResult<Vec<Fpga>> {
        Ok(self
            .client
            .query_fpgas(&board.key)?
            .into_iter()
            .map(|f| Fpga {
                board: board.key.clone(),
                index: f.index,
                name: f.name,
            })
            .collect())
    }

    fn axi_handles(&mut self, fpga: &Fpga) -> TransportResult<Vec<AxiHandle>> {
        Ok(self
            .client
            .axi_handles(&fpga.board, fpga.index)?
            .into_iter()
            .map(|h| AxiHandle {
                board: fpga.board.clone(),
                fpga: fpga.index,
                id: h.id,
                available: h.available,
            })
            .collect())
    }

    fn issue_transaction(
        &mut self,
        handle: &AxiHandle,
        transaction: &Transaction,
    ) -> TransportResult<TransactionResult> {
        let resp = self.client.issue_transaction(
            &handle.board,
            handle.fpga,
            handle.id,
            &to_wire(transaction),
        )?;
        Ok(TransactionResult {
            response: resp.response,
            value: resp.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axi::{
        CacheAttributes,
        TransactionOptions,
    };

    #[test]
    fn test_to_wire_write() {
        let t = Transaction::new(
            0xc000_0000,
            false,
            TransactionOptions::new(false, 8).unwrap(),
            CacheAttributes::new(true, false, true, false),
            Some(vec![0x5566_7788, 0x1122_3344]),
        )
        .unwrap();
        let w = to_wire(&t);
        assert_eq!(w.address, 0xc000_0000);
        assert!(!w.read_not_write);
        assert!(!w.options.incr_mode);
        assert_eq!(w.options.count, 2);
        assert!(w.cache_attributes.bufferable && w.cache_attributes.read_alloc);
        assert!(!w.cache_attributes.modifiable && !w.cache_attributes.write_alloc);
        assert_eq!(w.data, Some(vec![0x5566_7788, 0x1122_3344]));
    }

    #[test]
    fn test_to_wire_read() {
        let t = Transaction::new(
            0x1000,
            true,
            TransactionOptions::new(true, 16).unwrap(),
            CacheAttributes::default(),
            None,
        )
        .unwrap();
        let w = to_wire(&t);
        assert!(w.read_not_write);
        assert_eq!(w.options.count, 4);
        assert_eq!(w.data, None);
    }

    #[test]
    fn test_connect_is_lazy() {
        // Nothing listens here, but no request is made yet
        assert!(NextJtag::connect("http://127.0.0.1:9", &Config::default()).is_ok());
    }
}
