use njaxi::{
    axi::ResponseStatus,
    prelude::*,
    session,
    transport::mock::Mock,
    FormatError,
};

fn request(addr: u64, read_not_write: bool, size: u64, write_data: u64) -> Request {
    Request {
        addr,
        read_not_write,
        size,
        attributes: CacheAttributes::new(true, true, true, true),
        incrementing: true,
        write_data,
    }
}

/// Build, issue, and render a read the same way the binary does
fn read_dump(
    transport: &mut Mock,
    addr: u64,
    size: u64,
    columns: usize,
    column_size: u64,
) -> Result<String, anyhow::Error> {
    let transaction = request(addr, true, size, 0).build()?;
    let dump = HexDump::new(addr, columns, column_size)?;
    dump.check_len(transaction.options().byte_len())?;
    match session::run(transport, &Target::default(), &transaction)? {
        Outcome::Read(words) => Ok(dump.render_words(&words)?),
        Outcome::Written => anyhow::bail!("read came back as a write"),
    }
}

#[test]
fn read_single_word() -> anyhow::Result<()> {
    let mut transport = Mock::new(&[("SN1", 1)]).with_memory(0x1000, &[0xdead_beef]);
    assert_eq!(
        read_dump(&mut transport, 0x1000, 4, 1, 4)?,
        "000000001000: deadbeef\n"
    );
    Ok(())
}

#[test]
fn read_bytes_wrapped() -> anyhow::Result<()> {
    let mut transport = Mock::new(&[("SN1", 1)]).with_memory(0, &[0x3322_1100, 0x7766_5544]);
    assert_eq!(
        read_dump(&mut transport, 0, 8, 4, 1)?,
        "000000000000: 00 11 22 33\n000000000004: 44 55 66 77\n"
    );
    Ok(())
}

#[test]
fn odd_read_size_rounds_up() -> anyhow::Result<()> {
    let mut transport = Mock::new(&[("SN1", 1)]).with_memory(0x20, &[1, 2]);
    assert_eq!(
        read_dump(&mut transport, 0x20, 5, 2, 4)?,
        "000000000020: 00000001 00000002\n"
    );
    assert_eq!(transport.issued()[0].options().count(), 2);
    Ok(())
}

#[test]
fn write_then_read_back() -> anyhow::Result<()> {
    let mut transport = Mock::new(&[("SN1", 1)]);
    let write = request(0xc000_0000, false, 8, 0x1122_3344_5566_7788).build()?;
    assert_eq!(
        session::run(&mut transport, &Target::default(), &write)?,
        Outcome::Written
    );
    assert_eq!(transport.peek(0xc000_0000), 0x5566_7788);
    assert_eq!(transport.peek(0xc000_0004), 0x1122_3344);
    assert_eq!(
        read_dump(&mut transport, 0xc000_0000, 8, 1, 8)?,
        "0000c0000000: 1122334455667788\n"
    );
    Ok(())
}

#[test]
fn short_write_truncates() -> anyhow::Result<()> {
    let mut transport = Mock::new(&[("SN1", 1)]);
    let write = request(0x8, false, 4, 0x1122_3344_5566_7788).build()?;
    session::run(&mut transport, &Target::default(), &write)?;
    assert_eq!(transport.peek(0x8), 0x5566_7788);
    assert_eq!(transport.peek(0xc), 0);
    Ok(())
}

#[test]
fn hardware_error_stops_before_rendering() {
    let mut transport = Mock::new(&[("SN1", 1)])
        .with_memory(0x1000, &[0xdead_beef])
        .with_response("SLVERR");
    let err = read_dump(&mut transport, 0x1000, 4, 1, 4).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<Error>(),
        Some(Error::Hardware(ResponseStatus::SlvErr))
    ));
    assert_eq!(err.to_string(), "received error from hardware, SLVERR");
}

#[test]
fn unsupported_write_size_never_dispatches() {
    let err = request(0, false, 16, 0).build().unwrap_err();
    assert!(matches!(err, Error::Format(FormatError::WriteSize(16))));
}

#[test]
fn misaligned_never_dispatches() {
    for addr in [1u64, 2, 3, 0xc000_0001] {
        assert!(matches!(
            request(addr, true, 4, 0).build(),
            Err(Error::Alignment { .. })
        ));
    }
}

#[test]
fn column_size_checked_regardless_of_payload() {
    let mut transport = Mock::new(&[("SN1", 1)]).with_memory(0, &[1]);
    let err = read_dump(&mut transport, 0, 4, 1, 3).unwrap_err();
    assert_eq!(
        err.downcast_ref::<FormatError>(),
        Some(&FormatError::ColumnSize(3))
    );
    assert!(transport.issued().is_empty());
}

#[test]
fn partial_column_never_dispatches() {
    let mut transport = Mock::new(&[("SN1", 1)]).with_memory(0x1000, &[0xdead_beef]);
    let err = read_dump(&mut transport, 0x1000, 4, 1, 8).unwrap_err();
    assert_eq!(
        err.downcast_ref::<FormatError>(),
        Some(&FormatError::PartialElement { bytes: 4, width: 8 })
    );
    assert!(transport.issued().is_empty());
}
