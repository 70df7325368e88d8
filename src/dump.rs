//! Column formatted hex dumps of read data.
//!
//! Read words are laid out as a little-endian byte stream, then regrouped into elements of the
//! chosen [`ColumnSize`]. Each line starts with a 12 digit address label. The label is the base
//! address plus the *element* index, not the byte offset, so for columns wider than one byte the
//! label advances slower than the real bus address. The byte stream must split into whole elements,
//! a read that ends part way through one is an error rather than a padded value.

use crate::error::FormatError;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt::{
    self,
    Display,
};

/// Width of a single displayed element
#[derive(Debug, Copy, Clone, PartialEq, Eq, FromPrimitive)]
pub enum ColumnSize {
    Byte = 1,
    HalfWord = 2,
    Word = 4,
    DoubleWord = 8,
}

impl ColumnSize {
    /// Parse a width in bytes
    /// # Errors
    /// Returns [`FormatError::ColumnSize`] for anything but 1, 2, 4 or 8
    pub fn from_bytes(bytes: u64) -> Result<Self, FormatError> {
        Self::from_u64(bytes).ok_or(FormatError::ColumnSize(bytes))
    }

    #[must_use]
    pub fn bytes(self) -> usize {
        self as usize
    }

    /// Hex digits needed to print one element
    #[must_use]
    pub fn digits(self) -> usize {
        self.bytes() * 2
    }
}

/// Serialize words into their little-endian byte stream
#[must_use]
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
}

/// Layout settings for a dump
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HexDump {
    base: u64,
    columns: usize,
    size: ColumnSize,
}

impl HexDump {
    /// # Errors
    /// Returns an error on zero columns or an unsupported column size
    pub fn new(base: u64, columns: usize, column_size: u64) -> Result<Self, FormatError> {
        let size = ColumnSize::from_bytes(column_size)?;
        if columns == 0 {
            return Err(FormatError::NoColumns);
        }
        Ok(Self {
            base,
            columns,
            size,
        })
    }

    #[must_use]
    pub fn column_size(&self) -> ColumnSize {
        self.size
    }

    /// Check that `len` bytes split into whole elements
    /// # Errors
    /// Returns [`FormatError::PartialElement`] if a trailing element would be cut short
    pub fn check_len(&self, len: usize) -> Result<(), FormatError> {
        let width = self.size.bytes();
        if len % width != 0 {
            return Err(FormatError::PartialElement { bytes: len, width });
        }
        Ok(())
    }

    /// Regroup `bytes` into little-endian elements
    /// # Errors
    /// Returns [`FormatError::PartialElement`] if `bytes` ends part way through an element
    pub fn elements(&self, bytes: &[u8]) -> Result<Vec<u64>, FormatError> {
        self.check_len(bytes.len())?;
        Ok(bytes
            .chunks_exact(self.size.bytes())
            .map(|chunk| {
                let mut buf = [0u8; 8];
                buf[..chunk.len()].copy_from_slice(chunk);
                u64::from_le_bytes(buf)
            })
            .collect())
    }

    /// Render a byte stream. The result always ends in a newline.
    /// # Errors
    /// Returns [`FormatError::PartialElement`] if `bytes` ends part way through an element
    pub fn render_bytes(&self, bytes: &[u8]) -> Result<String, FormatError> {
        Ok(Rendered {
            layout: self,
            elements: self.elements(bytes)?,
        }
        .to_string())
    }

    /// Render the words returned by a read
    /// # Errors
    /// Returns [`FormatError::PartialElement`] if the words don't fill a whole number of columns
    pub fn render_words(&self, words: &[u32]) -> Result<String, FormatError> {
        self.render_bytes(&words_to_bytes(words))
    }
}

struct Rendered<'a> {
    layout: &'a HexDump,
    elements: Vec<u64>,
}

impl Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.layout.size.digits();
        let mut col = 0;
        for (i, elem) in self.elements.iter().enumerate() {
            if col >= self.layout.columns {
                writeln!(f)?;
                col = 0;
            }
            if col == 0 {
                write!(f, "{:012x}:", self.layout.base.wrapping_add(i as u64))?;
            }
            write!(f, " {elem:0digits$x}")?;
            col += 1;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paste::paste;

    /// Pull the element values back out of a rendered dump
    fn parse_elements(dump: &str) -> Vec<u64> {
        dump.lines()
            .flat_map(|line| {
                let (_, values) = line.split_once(':').unwrap();
                values
                    .split_whitespace()
                    .map(|v| u64::from_str_radix(v, 16).unwrap())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    fn elements_to_bytes(elements: &[u64], size: ColumnSize) -> Vec<u8> {
        elements
            .iter()
            .flat_map(|e| e.to_le_bytes()[..size.bytes()].to_vec())
            .collect()
    }

    macro_rules! test_width {
        ($size:literal, $digits:literal) => {
            paste! {
                #[test]
                fn [<test_width_$size>]() {
                    let words = [0x0302_0100u32, 0x0706_0504, 0x0b0a_0908, 0x0f0e_0d0c];
                    let dump = HexDump::new(0x40, 2, $size).unwrap();
                    let out = dump.render_words(&words).unwrap();
                    let n_elems = 16 / $size;
                    assert!(out.ends_with('\n'));
                    assert_eq!(out.lines().count(), (n_elems + 1) / 2);
                    for (row, line) in out.lines().enumerate() {
                        let label = format!("{:012x}:", 0x40 + row * 2);
                        assert!(line.starts_with(&label), "{line}");
                        for value in line[13..].split(' ').skip(1) {
                            assert_eq!(value.len(), $digits);
                        }
                    }
                    // Re-rendering the dumped bytes is stable
                    let again = elements_to_bytes(&parse_elements(&out), dump.column_size());
                    assert_eq!(dump.render_bytes(&again).unwrap(), out);
                }
            }
        };
    }

    test_width!(1, 2);
    test_width!(2, 4);
    test_width!(4, 8);
    test_width!(8, 16);

    #[test]
    fn test_single_word() {
        let dump = HexDump::new(0x1000, 1, 4).unwrap();
        assert_eq!(
            dump.render_words(&[0xdead_beef]).unwrap(),
            "000000001000: deadbeef\n"
        );
    }

    #[test]
    fn test_column_wrap() {
        let dump = HexDump::new(0, 4, 1).unwrap();
        let out = dump
            .render_bytes(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77])
            .unwrap();
        assert_eq!(
            out,
            "000000000000: 00 11 22 33\n000000000004: 44 55 66 77\n"
        );
    }

    #[test]
    fn test_little_endian_regroup() {
        let words = [0xdead_beefu32, 0x0123_4567];
        assert_eq!(
            HexDump::new(0, 8, 1).unwrap().render_words(&words).unwrap(),
            "000000000000: ef be ad de 67 45 23 01\n"
        );
        assert_eq!(
            HexDump::new(0, 8, 2).unwrap().render_words(&words).unwrap(),
            "000000000000: beef dead 4567 0123\n"
        );
        assert_eq!(
            HexDump::new(0, 8, 8).unwrap().render_words(&words).unwrap(),
            "000000000000: 01234567deadbeef\n"
        );
    }

    #[test]
    fn test_label_is_element_index() {
        let dump = HexDump::new(0x1000, 1, 4).unwrap();
        assert_eq!(
            dump.render_words(&[1, 2, 3]).unwrap(),
            "000000001000: 00000001\n000000001001: 00000002\n000000001002: 00000003\n"
        );
    }

    #[test]
    fn test_partial_trailing_element() {
        let dump = HexDump::new(0x1000, 1, 8).unwrap();
        assert_eq!(
            dump.render_words(&[0xdead_beef]),
            Err(FormatError::PartialElement { bytes: 4, width: 8 })
        );
        assert_eq!(
            HexDump::new(0, 4, 8)
                .unwrap()
                .render_words(&[0xaabb_ccdd, 0x1122_3344, 0x5566_7788]),
            Err(FormatError::PartialElement { bytes: 12, width: 8 })
        );
        assert_eq!(
            dump.render_words(&[0xaabb_ccdd, 0x1122_3344]).unwrap(),
            "000000001000: 11223344aabbccdd\n"
        );
    }

    #[test]
    fn test_check_len() {
        let dump = HexDump::new(0, 1, 2).unwrap();
        assert_eq!(dump.check_len(4), Ok(()));
        assert_eq!(
            dump.check_len(3),
            Err(FormatError::PartialElement { bytes: 3, width: 2 })
        );
        assert_eq!(dump.check_len(0), Ok(()));
    }

    #[test]
    fn test_empty_read() {
        assert_eq!(
            HexDump::new(0, 1, 4).unwrap().render_words(&[]).unwrap(),
            "\n"
        );
    }

    #[test]
    fn test_bad_column_size() {
        for size in [0u64, 3, 5, 6, 7, 16] {
            assert_eq!(
                HexDump::new(0, 1, size),
                Err(FormatError::ColumnSize(size))
            );
        }
    }

    #[test]
    fn test_no_columns() {
        assert_eq!(HexDump::new(0, 0, 4), Err(FormatError::NoColumns));
    }

    #[test]
    fn test_label_wraps() {
        let dump = HexDump::new(u64::MAX, 1, 4).unwrap();
        assert_eq!(
            dump.render_words(&[0, 0]).unwrap(),
            "ffffffffffffffff: 00000000\n000000000000: 00000000\n"
        );
    }
}
