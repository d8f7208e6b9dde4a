//! Gate types making up the nodes of a [`Network`](super::network::Network).

use super::signal::Signal;
use std::fmt;

/// A gate with two inputs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum BinaryType {
    And,
    Xor,
}

/// A gate with three inputs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TernaryType {
    And,
    Xor,
    Maj,
    Mux,
}

/// A gate with an arbitrary number of inputs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum NaryType {
    And,
    Or,
    Nand,
    Nor,
    Xor,
    Xnor,
}

/// A single node in the netlist: a combinational gate, a buffer, or a
/// sequential flip-flop.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub enum Gate {
    Binary([Signal; 2], BinaryType),
    Ternary([Signal; 3], TernaryType),
    Nary(Box<[Signal]>, NaryType),
    Buf(Signal),
    /// A D flip-flop: `[data, reset, init]`, reduced from a full set/reset/enable
    /// model since ATPG netlists do not need to model asynchronous set.
    Dff([Signal; 3]),
}

pub fn make_and(a: Signal, b: Signal) -> Normalization {
    if a == Signal::zero() || b == Signal::zero() {
        Normalization::Copy(Signal::zero())
    } else if a == Signal::one() {
        Normalization::Copy(b)
    } else if b == Signal::one() {
        Normalization::Copy(a)
    } else if a == b {
        Normalization::Copy(a)
    } else if a == !b {
        Normalization::Copy(Signal::zero())
    } else if a < b {
        Normalization::Node(Gate::Binary([a, b], BinaryType::And), false)
    } else {
        Normalization::Node(Gate::Binary([b, a], BinaryType::And), false)
    }
}

pub fn make_xor(a: Signal, b: Signal) -> Normalization {
    if a == Signal::zero() {
        Normalization::Copy(b)
    } else if b == Signal::zero() {
        Normalization::Copy(a)
    } else if a == Signal::one() {
        Normalization::Copy(!b)
    } else if b == Signal::one() {
        Normalization::Copy(!a)
    } else if a == b {
        Normalization::Copy(Signal::zero())
    } else if a == !b {
        Normalization::Copy(Signal::one())
    } else {
        let inv = a.is_inverted() ^ b.is_inverted();
        let (ua, ub) = (a.without_inversion(), b.without_inversion());
        let (x, y) = if ua < ub { (ua, ub) } else { (ub, ua) };
        Normalization::Node(Gate::Binary([x, y], BinaryType::Xor), inv)
    }
}

pub fn make_and3(a: Signal, b: Signal, c: Signal) -> Normalization {
    let mut v = [a, b, c];
    v.sort();
    if v[0] == Signal::zero() || v[0] == !v[1] || v[1] == !v[2] {
        return Normalization::Copy(Signal::zero());
    }
    Normalization::Node(Gate::Ternary(v, TernaryType::And), false)
}

pub fn make_xor3(a: Signal, b: Signal, c: Signal) -> Normalization {
    let inv = a.is_inverted() ^ b.is_inverted() ^ c.is_inverted();
    let mut v = [a.without_inversion(), b.without_inversion(), c.without_inversion()];
    v.sort();
    Normalization::Node(Gate::Ternary(v, TernaryType::Xor), inv)
}

pub fn make_maj(a: Signal, b: Signal, c: Signal) -> Normalization {
    let mut v = [a, b, c];
    v.sort();
    Normalization::Node(Gate::Ternary(v, TernaryType::Maj), false)
}

pub fn make_mux(s: Signal, a: Signal, b: Signal) -> Normalization {
    if a == b {
        return Normalization::Copy(a);
    }
    if s == Signal::zero() {
        return Normalization::Copy(b);
    }
    if s == Signal::one() {
        return Normalization::Copy(a);
    }
    let (s, a, b) = if s.is_inverted() { (!s, b, a) } else { (s, a, b) };
    Normalization::Node(Gate::Ternary([s, a, b], TernaryType::Mux), false)
}

pub fn make_dff(data: Signal, reset: Signal, enable: Signal) -> Normalization {
    Normalization::Node(Gate::Dff([data, reset, enable]), false)
}

pub fn make_andn(inputs: &[Signal]) -> Normalization {
    make_nary(inputs, NaryType::And)
}

pub fn make_xorn(inputs: &[Signal]) -> Normalization {
    make_nary(inputs, NaryType::Xor)
}

fn make_nary(inputs: &[Signal], ty: NaryType) -> Normalization {
    let mut v: Vec<Signal> = inputs.to_vec();
    v.sort();
    v.dedup();
    if v.len() == 1 {
        return Normalization::Copy(v[0]);
    }
    Normalization::Node(Gate::Nary(v.into_boxed_slice(), ty), false)
}

/// Result of building a canonical gate: either the gate itself (with a
/// top-level inversion flag), or an existing signal it collapses to.
pub enum Normalization {
    Node(Gate, bool),
    Copy(Signal),
}

impl Gate {
    pub fn is_canonical(&self) -> bool {
        self.make_canonical().0 == *self
    }

    /// Re-derive the canonical form and inversion of this gate.
    pub fn make_canonical(&self) -> (Gate, bool) {
        let norm = match self {
            Gate::Binary([a, b], BinaryType::And) => make_and(*a, *b),
            Gate::Binary([a, b], BinaryType::Xor) => make_xor(*a, *b),
            Gate::Ternary([a, b, c], TernaryType::And) => make_and3(*a, *b, *c),
            Gate::Ternary([a, b, c], TernaryType::Xor) => make_xor3(*a, *b, *c),
            Gate::Ternary([a, b, c], TernaryType::Maj) => make_maj(*a, *b, *c),
            Gate::Ternary([s, a, b], TernaryType::Mux) => make_mux(*s, *a, *b),
            Gate::Nary(v, NaryType::And) => make_andn(v),
            Gate::Nary(v, NaryType::Or) => {
                let negated: Vec<Signal> = v.iter().map(|s| !*s).collect();
                match make_andn(&negated) {
                    Normalization::Copy(s) => Normalization::Copy(!s),
                    Normalization::Node(g, inv) => Normalization::Node(g, !inv),
                }
            }
            Gate::Nary(v, NaryType::Nand) => match make_andn(v) {
                Normalization::Copy(s) => Normalization::Copy(!s),
                Normalization::Node(g, inv) => Normalization::Node(g, !inv),
            },
            Gate::Nary(v, NaryType::Nor) => {
                let negated: Vec<Signal> = v.iter().map(|s| !*s).collect();
                make_andn(&negated)
            }
            Gate::Nary(v, NaryType::Xor) => make_xorn(v),
            Gate::Nary(v, NaryType::Xnor) => match make_xorn(v) {
                Normalization::Copy(s) => Normalization::Copy(!s),
                Normalization::Node(g, inv) => Normalization::Node(g, !inv),
            },
            Gate::Buf(s) => Normalization::Copy(*s),
            Gate::Dff(v) => make_dff(v[0], v[1], v[2]),
        };
        match norm {
            Normalization::Node(g, inv) => (g, inv),
            Normalization::Copy(_) => (self.clone(), false),
        }
    }

    /// The signals this gate directly depends on.
    pub fn dependencies(&self) -> Vec<Signal> {
        match self {
            Gate::Binary(v, _) => v.to_vec(),
            Gate::Ternary(v, _) => v.to_vec(),
            Gate::Nary(v, _) => v.to_vec(),
            Gate::Buf(s) => vec![*s],
            Gate::Dff(v) => v.to_vec(),
        }
    }

    /// The gate-output (var) dependencies only, deduplicated.
    pub fn vars(&self) -> Vec<u32> {
        let mut v: Vec<u32> = self
            .dependencies()
            .iter()
            .filter(|s| s.is_var())
            .map(|s| s.var())
            .collect();
        v.sort();
        v.dedup();
        v
    }

    pub fn is_comb(&self) -> bool {
        !matches!(self, Gate::Dff(_))
    }

    pub fn is_and(&self) -> bool {
        matches!(self, Gate::Binary(_, BinaryType::And) | Gate::Ternary(_, TernaryType::And) | Gate::Nary(_, NaryType::And | NaryType::Nand))
    }

    pub fn is_xor(&self) -> bool {
        matches!(self, Gate::Binary(_, BinaryType::Xor) | Gate::Ternary(_, TernaryType::Xor) | Gate::Nary(_, NaryType::Xor | NaryType::Xnor))
    }

    pub fn is_and_like(&self) -> bool {
        self.is_and() || matches!(self, Gate::Nary(_, NaryType::Or | NaryType::Nor))
    }

    pub fn is_xor_like(&self) -> bool {
        self.is_xor()
    }

    pub fn is_buf_like(&self) -> bool {
        matches!(self, Gate::Buf(_))
    }

    /// Renumber every referenced var/input index through `order`.
    pub fn remap_order(&self, order: &[u32]) -> Gate {
        match self {
            Gate::Binary(v, t) => Gate::Binary([v[0].remap_order(order), v[1].remap_order(order)], *t),
            Gate::Ternary(v, t) => {
                Gate::Ternary([v[0].remap_order(order), v[1].remap_order(order), v[2].remap_order(order)], *t)
            }
            Gate::Nary(v, t) => Gate::Nary(v.iter().map(|s| s.remap_order(order)).collect(), *t),
            Gate::Buf(s) => Gate::Buf(s.remap_order(order)),
            Gate::Dff(v) => Gate::Dff([v[0].remap_order(order), v[1].remap_order(order), v[2].remap_order(order)]),
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Gate::Binary(v, BinaryType::And) => write!(f, "and({}, {})", v[0], v[1]),
            Gate::Binary(v, BinaryType::Xor) => write!(f, "xor({}, {})", v[0], v[1]),
            Gate::Ternary(v, TernaryType::And) => write!(f, "and3({}, {}, {})", v[0], v[1], v[2]),
            Gate::Ternary(v, TernaryType::Xor) => write!(f, "xor3({}, {}, {})", v[0], v[1], v[2]),
            Gate::Ternary(v, TernaryType::Maj) => write!(f, "maj({}, {}, {})", v[0], v[1], v[2]),
            Gate::Ternary(v, TernaryType::Mux) => write!(f, "mux({}, {}, {})", v[0], v[1], v[2]),
            Gate::Nary(v, t) => {
                let name = match t {
                    NaryType::And => "andn",
                    NaryType::Or => "orn",
                    NaryType::Nand => "nandn",
                    NaryType::Nor => "norn",
                    NaryType::Xor => "xorn",
                    NaryType::Xnor => "xnorn",
                };
                write!(f, "{}(", name)?;
                for (i, s) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", s)?;
                }
                write!(f, ")")
            }
            Gate::Buf(s) => write!(f, "buf({})", s),
            Gate::Dff(v) => write!(f, "dff({}, {}, {})", v[0], v[1], v[2]),
        }
    }
}
