//! Plain multi-cycle good-circuit simulation, used by the `simulate` CLI
//! subcommand (no fault injection, one call per clock cycle).

use super::eval::{apply_inversion, eval_comb};
use super::packed::PackedVal;
use crate::network::{Gate, Netlist, Signal};
use crate::testvector::{Bit, TestVector};
use fxhash::FxHashMap;

/// Run `netlist` over a sequence of input vectors, one per clock cycle,
/// starting from an all-X flip-flop state, and return the primary-output
/// vector observed at each cycle.
pub fn simulate(netlist: &Netlist, cycles: &[TestVector]) -> Vec<TestVector> {
    let mut dff_state: FxHashMap<u32, PackedVal> = FxHashMap::default();
    let mut outputs = Vec::with_capacity(cycles.len());
    for cycle in cycles {
        let pi: Vec<PackedVal> = (0..cycle.len())
            .map(|i| match cycle.get(i) {
                Bit::Zero => PackedVal::broadcast(false),
                Bit::One => PackedVal::broadcast(true),
                Bit::X => PackedVal::all_x(),
            })
            .collect();
        let (values, next_state) = simulate_one_frame(netlist, &pi, &dff_state);
        let mut out = TestVector::new(netlist.network().nb_outputs());
        for o in 0..netlist.network().nb_outputs() {
            let s = netlist.network().output(o);
            let v = read(s, &values);
            out.set(o, Bit::from_value(v.lane(0).map(|b| b as u8)));
        }
        outputs.push(out);
        dff_state = next_state;
    }
    outputs
}

fn read(s: Signal, values: &[PackedVal]) -> PackedVal {
    let v = if s.is_constant() {
        PackedVal::broadcast(false)
    } else if s.is_input() {
        PackedVal::all_x()
    } else {
        values[s.var() as usize]
    };
    apply_inversion(v, s.is_inverted())
}

fn simulate_one_frame(
    netlist: &Netlist,
    pi_values: &[PackedVal],
    dff_state: &FxHashMap<u32, PackedVal>,
) -> (Vec<PackedVal>, FxHashMap<u32, PackedVal>) {
    let n = netlist.nb_nodes();
    let mut values = vec![PackedVal::all_x(); n];
    let read_signal = |s: Signal, values: &[PackedVal]| -> PackedVal {
        let v = if s.is_constant() {
            PackedVal::broadcast(false)
        } else if s.is_input() {
            pi_values[s.input() as usize]
        } else {
            values[s.var() as usize]
        };
        apply_inversion(v, s.is_inverted())
    };
    for i in 0..n {
        let gate = netlist.network().gate(i);
        if let Gate::Dff(_) = gate {
            values[i] = *dff_state.get(&(i as u32)).unwrap_or(&PackedVal::all_x());
            continue;
        }
        let fanins: Vec<PackedVal> = gate.dependencies().iter().map(|s| read_signal(*s, &values)).collect();
        values[i] = if let Gate::Buf(_) = gate { fanins[0] } else { eval_comb(gate, &fanins) };
    }
    let mut next_state = FxHashMap::default();
    for i in 0..n {
        if let Gate::Dff(v) = netlist.network().gate(i) {
            next_state.insert(i as u32, read_signal(v[0], &values));
        }
    }
    (values, next_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    #[test]
    fn test_simulate_comb() {
        let mut net = Network::new();
        let inputs = net.add_inputs(2);
        let a = net.and(inputs[0], inputs[1]);
        net.add_output(a);
        let nl = Netlist::build(net);
        let mut cycle = TestVector::new(2);
        cycle.set(0, Bit::One);
        cycle.set(1, Bit::One);
        let out = simulate(&nl, &[cycle]);
        assert_eq!(out[0].get(0), Bit::One);
    }

    #[test]
    fn test_simulate_dff_delays_one_cycle() {
        let mut net = Network::new();
        let inputs = net.add_inputs(1);
        let q = net.dff(inputs[0], crate::network::Signal::zero(), crate::network::Signal::one());
        net.add_output(q);
        let nl = Netlist::build(net);
        let mut c0 = TestVector::new(1);
        c0.set(0, Bit::One);
        let mut c1 = TestVector::new(1);
        c1.set(0, Bit::Zero);
        let out = simulate(&nl, &[c0, c1]);
        assert_eq!(out[0].get(0), Bit::X);
        assert_eq!(out[1].get(0), Bit::One);
    }
}
