//! The core gate-level logic graph: inputs, outputs and gates connected by
//! [`Signal`]s.

use super::gates::{self, BinaryType, Gate, NaryType, Normalization, TernaryType};
use super::signal::Signal;
use std::fmt;

/// A combinational/sequential gate-inverter graph.
///
/// Gates are stored in a flat vector and referenced by index through
/// [`Signal::from_var`]. Primary inputs are a separate namespace referenced
/// through [`Signal::from_input`].
#[derive(Clone, Debug, Default)]
pub struct Network {
    nodes: Vec<Gate>,
    nb_inputs: u32,
    outputs: Vec<Signal>,
}

impl Network {
    pub fn new() -> Network {
        Network::default()
    }

    pub fn nb_inputs(&self) -> usize {
        self.nb_inputs as usize
    }

    pub fn nb_outputs(&self) -> usize {
        self.outputs.len()
    }

    pub fn nb_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn input(&self, i: usize) -> Signal {
        assert!(i < self.nb_inputs());
        Signal::from_input(i as u32)
    }

    pub fn output(&self, i: usize) -> Signal {
        self.outputs[i]
    }

    pub fn node(&self, i: usize) -> Signal {
        assert!(i < self.nb_nodes());
        Signal::from_var(i as u32)
    }

    pub fn gate(&self, i: usize) -> &Gate {
        &self.nodes[i]
    }

    pub fn add_input(&mut self) -> Signal {
        let s = Signal::from_input(self.nb_inputs);
        self.nb_inputs += 1;
        s
    }

    pub fn add_inputs(&mut self, n: usize) -> Vec<Signal> {
        (0..n).map(|_| self.add_input()).collect()
    }

    pub fn add_output(&mut self, s: Signal) {
        self.outputs.push(s);
    }

    fn push(&mut self, norm: Normalization) -> Signal {
        match norm {
            Normalization::Copy(s) => s,
            Normalization::Node(g, inv) => {
                let ind = self.nodes.len() as u32;
                self.nodes.push(g);
                Signal::from_var(ind) ^ inv
            }
        }
    }

    pub fn and(&mut self, a: Signal, b: Signal) -> Signal {
        self.push(gates::make_and(a, b))
    }

    pub fn xor(&mut self, a: Signal, b: Signal) -> Signal {
        self.push(gates::make_xor(a, b))
    }

    pub fn and3(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        self.push(gates::make_and3(a, b, c))
    }

    pub fn xor3(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        self.push(gates::make_xor3(a, b, c))
    }

    pub fn maj(&mut self, a: Signal, b: Signal, c: Signal) -> Signal {
        self.push(gates::make_maj(a, b, c))
    }

    pub fn mux(&mut self, s: Signal, a: Signal, b: Signal) -> Signal {
        self.push(gates::make_mux(s, a, b))
    }

    pub fn and_n(&mut self, inputs: &[Signal]) -> Signal {
        self.push(gates::make_andn(inputs))
    }

    pub fn or_n(&mut self, inputs: &[Signal]) -> Signal {
        let negated: Vec<Signal> = inputs.iter().map(|s| !*s).collect();
        !self.push(gates::make_andn(&negated))
    }

    pub fn xor_n(&mut self, inputs: &[Signal]) -> Signal {
        self.push(gates::make_xorn(inputs))
    }

    pub fn buf(&mut self, s: Signal) -> Signal {
        s
    }

    pub fn dff(&mut self, data: Signal, reset: Signal, enable: Signal) -> Signal {
        self.push(gates::make_dff(data, reset, enable))
    }

    /// Add a gate that has already been put in canonical form, without
    /// re-deriving it. Used by readers that already know the gate is
    /// canonical (e.g. a `.bench` parser building And/Nand/Or gates directly).
    pub fn add_canonical(&mut self, g: Gate) -> Signal {
        debug_assert!(g.is_canonical());
        let ind = self.nodes.len() as u32;
        self.nodes.push(g);
        Signal::from_var(ind)
    }

    /// Add an arbitrary gate, canonicalizing it first.
    pub fn add(&mut self, g: Gate) -> Signal {
        let (canon, inv) = g.make_canonical();
        match canon {
            Gate::Buf(s) => s ^ inv,
            other => self.add_canonical(other) ^ inv,
        }
    }

    pub fn is_comb(&self) -> bool {
        self.nodes.iter().all(|g| g.is_comb())
    }

    /// Whether gates are topologically sorted: each gate's fanin only
    /// references gates with a lower index (flip-flop data inputs excepted,
    /// since they may form a cycle through the clock boundary).
    pub fn is_topo_sorted(&self) -> bool {
        for (i, g) in self.nodes.iter().enumerate() {
            if let Gate::Dff(_) = g {
                continue;
            }
            for s in g.dependencies() {
                if s.is_var() && s.var() as usize >= i {
                    return false;
                }
            }
        }
        true
    }

    /// Remove gates that no output or flip-flop input transitively depends on.
    pub fn sweep(&mut self) {
        let mut used = vec![false; self.nodes.len()];
        let mut stack: Vec<u32> = self
            .outputs
            .iter()
            .chain(self.nodes.iter().flat_map(|g| g.dependencies()).collect::<Vec<_>>().iter())
            .filter(|s| s.is_var())
            .map(|s| s.var())
            .collect();
        // Flip-flop fanins always count as used, regardless of reachability from
        // an output, since they drive state across frames.
        for g in &self.nodes {
            if matches!(g, Gate::Dff(_)) {
                for s in g.dependencies() {
                    if s.is_var() {
                        stack.push(s.var());
                    }
                }
            }
        }
        while let Some(i) = stack.pop() {
            if used[i as usize] {
                continue;
            }
            used[i as usize] = true;
            for s in self.nodes[i as usize].dependencies() {
                if s.is_var() {
                    stack.push(s.var());
                }
            }
        }
        let mut order = vec![0u32; self.nodes.len()];
        let mut new_nodes = Vec::new();
        for (i, g) in self.nodes.iter().enumerate() {
            if used[i] {
                order[i] = new_nodes.len() as u32;
                new_nodes.push(g.clone());
            }
        }
        for g in new_nodes.iter_mut() {
            *g = g.remap_order(&order);
        }
        self.outputs = self.outputs.iter().map(|s| s.remap_order(&order)).collect();
        self.nodes = new_nodes;
    }

    /// Merge duplicate gates (structural hashing pass).
    pub fn dedup(&mut self) {
        use fxhash::FxHashMap;
        let mut seen: FxHashMap<Gate, u32> = FxHashMap::default();
        let mut order = vec![0u32; self.nodes.len()];
        let mut new_nodes = Vec::new();
        for (i, g) in self.nodes.iter().enumerate() {
            let remapped = g.remap_order(&order[..i]);
            if let Some(&existing) = seen.get(&remapped) {
                order[i] = existing;
            } else {
                let new_ind = new_nodes.len() as u32;
                seen.insert(remapped.clone(), new_ind);
                new_nodes.push(remapped);
                order[i] = new_ind;
            }
        }
        self.outputs = self.outputs.iter().map(|s| s.remap_order(&order)).collect();
        self.nodes = new_nodes;
    }

    /// Reorder gates into topological order, preserving signal semantics.
    pub fn topo_sort(&mut self) {
        let n = self.nodes.len();
        let mut visited = vec![false; n];
        let mut order = vec![0u32; n];
        let mut new_nodes: Vec<Gate> = Vec::with_capacity(n);

        fn visit(
            i: usize,
            nodes: &[Gate],
            visited: &mut [bool],
            order: &mut [u32],
            new_nodes: &mut Vec<Gate>,
        ) {
            if visited[i] {
                return;
            }
            visited[i] = true;
            if !matches!(nodes[i], Gate::Dff(_)) {
                for s in nodes[i].dependencies() {
                    if s.is_var() {
                        visit(s.var() as usize, nodes, visited, order, new_nodes);
                    }
                }
            }
            order[i] = new_nodes.len() as u32;
            new_nodes.push(nodes[i].clone());
        }

        let nodes_copy = self.nodes.clone();
        for i in 0..n {
            visit(i, &nodes_copy, &mut visited, &mut order, &mut new_nodes);
        }
        for g in new_nodes.iter_mut() {
            *g = g.remap_order(&order);
        }
        self.outputs = self.outputs.iter().map(|s| s.remap_order(&order)).collect();
        self.nodes = new_nodes;
    }

    /// Validate internal invariants: referenced indices in range, gates canonical.
    pub fn check(&self) {
        assert!(self.is_valid());
    }

    pub fn is_valid(&self) -> bool {
        for (i, g) in self.nodes.iter().enumerate() {
            for s in g.dependencies() {
                if s.is_var() && s.var() as usize >= self.nodes.len() {
                    return false;
                }
                if s.is_input() && s.input() >= self.nb_inputs {
                    return false;
                }
                if !matches!(g, Gate::Dff(_)) && s.is_var() && s.var() as usize >= i {
                    return false;
                }
            }
        }
        for s in &self.outputs {
            if s.is_var() && s.var() as usize >= self.nodes.len() {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "inputs: {}", self.nb_inputs)?;
        for (i, g) in self.nodes.iter().enumerate() {
            writeln!(f, "v{} = {}", i, g)?;
        }
        for (i, s) in self.outputs.iter().enumerate() {
            writeln!(f, "output {}: {}", i, s)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], inputs[1]);
        net.add_output(a);
        assert_eq!(net.nb_inputs(), 2);
        assert_eq!(net.nb_outputs(), 1);
        assert!(net.is_valid());
        assert!(net.is_comb());
    }

    #[test]
    fn test_dff() {
        let mut net = Network::new();
        let inputs = net.add_inputs(1);
        let q = net.dff(inputs[0], Signal::zero(), Signal::one());
        net.add_output(q);
        assert!(!net.is_comb());
        assert!(net.is_valid());
    }

    #[test]
    fn test_nary() {
        let mut net = Network::new();
        let inputs = net.add_inputs(4);
        let a = net.and_n(&inputs);
        let o = net.or_n(&inputs);
        net.add_output(a);
        net.add_output(o);
        assert!(net.is_valid());
    }

    #[test]
    fn test_sweep() {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let _dead = net.and(inputs[0], inputs[1]);
        let live = net.xor(inputs[0], inputs[1]);
        net.add_output(live);
        net.sweep();
        assert_eq!(net.nb_nodes(), 1);
        assert!(net.is_valid());
    }

    #[test]
    fn test_dedup() {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a1 = net.and(inputs[0], inputs[1]);
        let a2 = net.and(inputs[0], inputs[1]);
        net.add_output(a1);
        net.add_output(a2);
        net.dedup();
        assert_eq!(net.nb_nodes(), 1);
    }

    #[test]
    fn test_topo_sort() {
        let mut net = Network::new();
        let inputs = net.add_inputs(3);
        let a = net.and(inputs[0], inputs[1]);
        let b = net.xor(a, inputs[2]);
        net.add_output(b);
        net.topo_sort();
        assert!(net.is_topo_sorted());
        assert!(net.is_valid());
    }
}
