//! Reading and writing test-pattern sets, one pattern per line, as `0`/`1`/`X`
//! strings. A finished test set has no `X` left (they're resolved by
//! [`TestVector::fix_x_from_random`](crate::testvector::TestVector::fix_x_from_random)
//! before writing), but `X`/`x`/`-` are still accepted on read for
//! partially-specified or hand-edited pattern files.

use std::io::{BufRead, BufReader, Read, Write};

use crate::testvector::{Bit, TestVector};

/// Read one [`TestVector`] per non-empty, non-comment line. Every line must
/// have the same length, which becomes the input count of every returned
/// vector.
pub fn read_patterns<R: Read>(r: R) -> Result<Vec<TestVector>, String> {
    let mut out = Vec::new();
    let mut nb_inputs = None;
    for line in BufReader::new(r).lines() {
        let line = line.map_err(|e| e.to_string())?;
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        let n = *nb_inputs.get_or_insert(t.len());
        if t.len() != n {
            return Err(format!("pattern line has {} bits, expected {}", t.len(), n));
        }
        let mut bits = Vec::with_capacity(n);
        for c in t.chars() {
            bits.push(match c {
                '0' => Bit::Zero,
                '1' => Bit::One,
                'X' | 'x' | '-' => Bit::X,
                other => return Err(format!("invalid pattern character {other}")),
            });
        }
        out.push(TestVector::from_bits(bits));
    }
    Ok(out)
}

/// Write one pattern per line, in the same `0`/`1`/`X` format [`read_patterns`]
/// accepts.
pub fn write_patterns<W: Write>(w: &mut W, patterns: &[TestVector]) -> std::io::Result<()> {
    for p in patterns {
        writeln!(w, "{}", p.bit_str())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let mut v0 = TestVector::new(4);
        v0.set(0, Bit::One);
        v0.set(1, Bit::Zero);
        v0.set(2, Bit::One);
        v0.set(3, Bit::Zero);
        let mut v1 = TestVector::new(4);
        v1.set(0, Bit::X);
        v1.set(1, Bit::X);
        v1.set(2, Bit::One);
        v1.set(3, Bit::One);
        let patterns = vec![v0, v1];

        let mut buf = Vec::new();
        write_patterns(&mut buf, &patterns).unwrap();
        let parsed = read_patterns(buf.as_slice()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].bit_str(), "1010");
        assert_eq!(parsed[1].bit_str(), "XX11");
    }

    #[test]
    fn test_mismatched_length_is_error() {
        let input = "101\n10\n";
        assert!(read_patterns(input.as_bytes()).is_err());
    }
}
