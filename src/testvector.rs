//! Input test vectors: the final output of DTPG, serialized as packed hex
//! digits in the same convention Atalanta-style pattern files use.

use rand::Rng;
use std::fmt;

/// A 3-valued bit: `X` means "don't care", filled randomly before the vector
/// is written out.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Bit {
    Zero,
    One,
    X,
}

impl Bit {
    pub fn from_value(v: Option<u8>) -> Bit {
        match v {
            Some(0) => Bit::Zero,
            Some(1) => Bit::One,
            _ => Bit::X,
        }
    }
}

/// A single primary-input test vector, one [`Bit`] per input.
#[derive(Clone, Debug, Default)]
pub struct TestVector {
    bits: Vec<Bit>,
}

impl TestVector {
    pub fn new(nb_inputs: usize) -> TestVector {
        TestVector {
            bits: vec![Bit::X; nb_inputs],
        }
    }

    pub fn from_bits(bits: Vec<Bit>) -> TestVector {
        TestVector { bits }
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn get(&self, i: usize) -> Bit {
        self.bits[i]
    }

    pub fn set(&mut self, i: usize, b: Bit) {
        self.bits[i] = b;
    }

    /// Replace every `X` with a uniformly random 0/1.
    pub fn fix_x_from_random<R: Rng>(&mut self, rng: &mut R) {
        for b in self.bits.iter_mut() {
            if *b == Bit::X {
                *b = if rng.gen::<bool>() { Bit::One } else { Bit::Zero };
            }
        }
    }

    /// Hex-packed string, 4 bits per digit, most-significant input first,
    /// matching the one-bit-per-input convention used by `.bench` pattern
    /// files. A nibble with no `X` bit is a single `0`-`f` hex digit; a
    /// nibble with at least one `X` bit instead expands to a leading `x`
    /// followed by its four bits spelled out literally as `0`/`1`/`x`, so the
    /// string round-trips exactly through [`from_hex_str`](Self::from_hex_str)
    /// even for partially-specified vectors.
    pub fn hex_str(&self) -> String {
        let mut out = String::new();
        for chunk in self.bits.chunks(4) {
            if chunk.iter().any(|b| *b == Bit::X) {
                out.push('x');
                for i in 0..4 {
                    let b = chunk.get(i).copied().unwrap_or(Bit::X);
                    out.push(match b {
                        Bit::Zero => '0',
                        Bit::One => '1',
                        Bit::X => 'x',
                    });
                }
            } else {
                let mut nibble = 0u8;
                for (i, b) in chunk.iter().enumerate() {
                    let bit = match b {
                        Bit::One => 1,
                        _ => 0,
                    };
                    nibble |= bit << (3 - i);
                }
                out.push(std::char::from_digit(nibble as u32, 16).unwrap());
            }
        }
        out
    }

    /// Parse a hex-packed string produced by [`hex_str`](Self::hex_str) back
    /// into `nb_inputs` bits, recovering `X` bits from their `x`-led literal
    /// nibble form.
    pub fn from_hex_str(s: &str, nb_inputs: usize) -> Option<TestVector> {
        let mut bits = Vec::with_capacity(nb_inputs);
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == 'x' {
                for _ in 0..4 {
                    let lb = chars.next()?;
                    if bits.len() < nb_inputs {
                        bits.push(match lb {
                            '0' => Bit::Zero,
                            '1' => Bit::One,
                            'x' => Bit::X,
                            _ => return None,
                        });
                    }
                }
            } else {
                let nibble = c.to_digit(16)?;
                for i in 0..4 {
                    if bits.len() < nb_inputs {
                        bits.push(if nibble & (1 << (3 - i)) != 0 { Bit::One } else { Bit::Zero });
                    }
                }
            }
        }
        if bits.len() != nb_inputs {
            return None;
        }
        Some(TestVector { bits })
    }

    /// The legacy Atalanta-style one-character-per-bit string (`0`/`1`/`X`).
    pub fn bit_str(&self) -> String {
        self.bits
            .iter()
            .map(|b| match b {
                Bit::Zero => '0',
                Bit::One => '1',
                Bit::X => 'X',
            })
            .collect()
    }
}

impl fmt::Display for TestVector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.bit_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_hex_roundtrip() {
        let mut v = TestVector::new(8);
        for i in 0..8 {
            v.set(i, if i % 2 == 0 { Bit::One } else { Bit::Zero });
        }
        let hex = v.hex_str();
        let back = TestVector::from_hex_str(&hex, 8).unwrap();
        for i in 0..8 {
            assert_eq!(v.get(i), back.get(i));
        }
    }

    #[test]
    fn test_hex_roundtrip_with_x_bits() {
        let mut v = TestVector::new(9);
        v.set(0, Bit::One);
        v.set(1, Bit::X);
        v.set(2, Bit::Zero);
        v.set(3, Bit::Zero);
        v.set(4, Bit::One);
        v.set(5, Bit::One);
        v.set(6, Bit::One);
        v.set(7, Bit::One);
        v.set(8, Bit::X);
        let hex = v.hex_str();
        let back = TestVector::from_hex_str(&hex, 9).unwrap();
        for i in 0..9 {
            assert_eq!(v.get(i), back.get(i));
        }
    }

    #[test]
    fn test_hex_roundtrip_all_x() {
        let v = TestVector::new(4);
        let back = TestVector::from_hex_str(&v.hex_str(), 4).unwrap();
        for i in 0..4 {
            assert_eq!(back.get(i), Bit::X);
        }
    }

    #[test]
    fn test_fix_x() {
        let mut v = TestVector::new(6);
        let mut rng = SmallRng::seed_from_u64(42);
        v.fix_x_from_random(&mut rng);
        assert!(v.bits.iter().all(|b| *b != Bit::X));
    }

    #[test]
    fn test_bit_str() {
        let mut v = TestVector::new(3);
        v.set(0, Bit::One);
        v.set(1, Bit::X);
        v.set(2, Bit::Zero);
        assert_eq!(v.bit_str(), "1X0");
    }
}
