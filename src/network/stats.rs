//! Gate-count statistics for a [`Network`](super::network::Network), used by
//! the `show` CLI subcommand.

use super::gates::{BinaryType, Gate, NaryType, TernaryType};
use super::network::Network;
use std::fmt;

/// Gate-count breakdown of a network.
#[derive(Clone, Debug, Default)]
pub struct NetworkStats {
    pub nb_inputs: usize,
    pub nb_outputs: usize,
    pub nb_and: usize,
    pub nb_xor: usize,
    pub nb_mux: usize,
    pub nb_maj: usize,
    pub nb_nary: usize,
    pub nb_buf: usize,
    pub nb_dff: usize,
}

impl NetworkStats {
    pub fn nb_nodes(&self) -> usize {
        self.nb_and + self.nb_xor + self.nb_mux + self.nb_maj + self.nb_nary + self.nb_buf + self.nb_dff
    }
}

/// Compute gate-count statistics for `network`.
///
/// ```
/// use scanforge::network::{Network, stats::stats};
/// let mut net = Network::new();
/// let inputs = net.add_inputs(2);
/// let a = net.and(inputs[0], inputs[1]);
/// net.add_output(a);
/// let s = stats(&net);
/// assert_eq!(s.nb_and, 1);
/// ```
pub fn stats(network: &Network) -> NetworkStats {
    let mut s = NetworkStats {
        nb_inputs: network.nb_inputs(),
        nb_outputs: network.nb_outputs(),
        ..Default::default()
    };
    for i in 0..network.nb_nodes() {
        match network.gate(i) {
            Gate::Binary(_, BinaryType::And) => s.nb_and += 1,
            Gate::Binary(_, BinaryType::Xor) => s.nb_xor += 1,
            Gate::Ternary(_, TernaryType::And) => s.nb_and += 1,
            Gate::Ternary(_, TernaryType::Xor) => s.nb_xor += 1,
            Gate::Ternary(_, TernaryType::Maj) => s.nb_maj += 1,
            Gate::Ternary(_, TernaryType::Mux) => s.nb_mux += 1,
            Gate::Nary(_, NaryType::And | NaryType::Nand | NaryType::Or | NaryType::Nor) => s.nb_and += 1,
            Gate::Nary(_, NaryType::Xor | NaryType::Xnor) => s.nb_xor += 1,
            Gate::Buf(_) => s.nb_buf += 1,
            Gate::Dff(_) => s.nb_dff += 1,
        }
    }
    s
}

impl fmt::Display for NetworkStats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "  Inputs:      {}", self.nb_inputs)?;
        writeln!(f, "  Outputs:     {}", self.nb_outputs)?;
        writeln!(f, "  And gates:   {}", self.nb_and)?;
        writeln!(f, "  Xor gates:   {}", self.nb_xor)?;
        writeln!(f, "  Mux gates:   {}", self.nb_mux)?;
        writeln!(f, "  Maj gates:   {}", self.nb_maj)?;
        writeln!(f, "  Buffers:     {}", self.nb_buf)?;
        write!(f, "  Flip-flops:  {}", self.nb_dff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::signal::Signal;

    #[test]
    fn test_stats() {
        let mut net = Network::new();
        let inputs = net.add_inputs(3);
        let a = net.and(inputs[0], inputs[1]);
        let x = net.xor(a, inputs[2]);
        let q = net.dff(x, Signal::zero(), Signal::one());
        net.add_output(q);
        let s = stats(&net);
        assert_eq!(s.nb_and, 1);
        assert_eq!(s.nb_xor, 1);
        assert_eq!(s.nb_dff, 1);
        assert_eq!(s.nb_inputs, 3);
    }
}
