//! IO for `.bench` (ISCAS-89 style) files: the same plain-text gate-list
//! format the original ATPG benchmarks ship in, read into a [`Network`] and
//! written back out after synthesis-free transforms like sweeping.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};

use crate::network::{Gate, NaryType, Network, Signal};

use super::utils::{get_inverted_signals, sig_to_string};

fn build_name_to_sig(statements: &[Vec<String>], inputs: &[String]) -> HashMap<String, Signal> {
    let mut ret = HashMap::new();
    for (i, name) in inputs.iter().enumerate() {
        let present = ret.insert(name.clone(), Signal::from_input(i as u32)).is_some();
        assert!(!present, "{} is defined twice", name);
    }
    for (i, s) in statements.iter().enumerate() {
        let present = ret.insert(s[0].clone(), Signal::from_var(i as u32)).is_some();
        assert!(!present, "{} is defined twice", s[0]);
    }
    if !ret.contains_key("vdd") {
        ret.insert("vdd".to_string(), Signal::one());
    }
    if !ret.contains_key("gnd") {
        ret.insert("gnd".to_string(), Signal::zero());
    }
    ret
}

fn check_statement(statement: &[String], name_to_sig: &HashMap<String, Signal>) {
    let deps = &statement[2..];
    for dep in deps {
        assert!(name_to_sig.contains_key(dep), "gate input {dep} is not generated anywhere");
    }
    match statement[1].to_uppercase().as_str() {
        "DFF" | "BUF" | "BUFF" | "NOT" => assert_eq!(deps.len(), 1),
        "VDD" | "VSS" | "GND" => assert_eq!(deps.len(), 0),
        "MUX" | "MAJ" => assert_eq!(deps.len(), 3),
        "DFFRSE" => assert_eq!(deps.len(), 4),
        _ => (),
    }
}

fn gate_dependencies(statement: &[String], name_to_sig: &HashMap<String, Signal>) -> Box<[Signal]> {
    statement[2..].iter().map(|n| name_to_sig[n]).collect()
}

fn network_from_statements(statements: &[Vec<String>], inputs: &[String], outputs: &[String]) -> Result<Network, String> {
    let mut net = Network::new();
    net.add_inputs(inputs.len());

    let name_to_sig = build_name_to_sig(statements, inputs);
    for statement in statements {
        check_statement(statement, &name_to_sig);
    }
    for output in outputs {
        if !name_to_sig.contains_key(output) {
            return Err(format!("output {output} is not generated anywhere"));
        }
    }

    for s in statements {
        let sigs = gate_dependencies(s, &name_to_sig);
        match s[1].to_uppercase().as_str() {
            "DFF" => {
                net.add(Gate::Dff([sigs[0], Signal::zero(), Signal::one()]));
            }
            "DFFRSE" => {
                net.add(Gate::Dff([sigs[0], sigs[1], sigs[3]]));
            }
            "BUF" | "BUFF" => {
                net.add(Gate::Buf(sigs[0]));
            }
            "NOT" => {
                net.add(Gate::Buf(!sigs[0]));
            }
            "VDD" => {
                net.add(Gate::Buf(Signal::one()));
            }
            "VSS" | "GND" => {
                net.add(Gate::Buf(Signal::zero()));
            }
            "AND" => {
                net.add(Gate::Nary(sigs, NaryType::And));
            }
            "NAND" => {
                net.add(Gate::Nary(sigs, NaryType::Nand));
            }
            "OR" => {
                net.add(Gate::Nary(sigs, NaryType::Or));
            }
            "NOR" => {
                net.add(Gate::Nary(sigs, NaryType::Nor));
            }
            "XOR" => {
                net.add(Gate::Nary(sigs, NaryType::Xor));
            }
            "XNOR" => {
                net.add(Gate::Nary(sigs, NaryType::Xnor));
            }
            "MUX" => {
                net.mux(sigs[0], sigs[1], sigs[2]);
            }
            "MAJ" => {
                net.maj(sigs[0], sigs[1], sigs[2]);
            }
            other => return Err(format!("unknown gate type {other}")),
        }
    }
    for o in outputs {
        net.add_output(name_to_sig[o]);
    }
    net.topo_sort();
    net.check();
    Ok(net)
}

/// Read a network in `.bench` format, as used by the ISCAS benchmarks:
/// ```text
///     INPUT(i0)
///     INPUT(i1)
///     x0 = AND(i0, i1)
///     x1 = NAND(x0, i1)
///     OUTPUT(x1)
/// ```
pub fn read_bench<R: Read>(r: R) -> Result<Network, String> {
    let mut statements = Vec::new();
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for line in BufReader::new(r).lines() {
        let line = line.map_err(|e| e.to_string())?;
        let t = line.trim();
        if t.is_empty() || t.starts_with('#') {
            continue;
        }
        if !t.contains('=') {
            let parts: Vec<_> = t.split(['(', ')']).map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
            if parts.len() != 2 {
                return Err(format!("malformed statement: {t}"));
            }
            match parts[0] {
                "INPUT" | "PINPUT" => inputs.push(parts[1].to_string()),
                "OUTPUT" | "POUTPUT" => outputs.push(parts[1].to_string()),
                other => return Err(format!("unknown keyword {other}")),
            }
        } else {
            let parts: Vec<String> = t
                .split(['=', '(', ',', ')'])
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect();
            if parts.len() < 2 {
                return Err(format!("malformed statement: {t}"));
            }
            statements.push(parts);
        }
    }
    network_from_statements(&statements, &inputs, &outputs)
}

/// Write `network` in `.bench` format.
pub fn write_bench<W: Write>(w: &mut W, network: &Network) -> std::io::Result<()> {
    writeln!(w, "# .bench (ISCAS) file")?;
    for i in 0..network.nb_inputs() {
        writeln!(w, "INPUT(i{})", i)?;
    }
    writeln!(w)?;
    for i in 0..network.nb_outputs() {
        writeln!(w, "OUTPUT({})", sig_to_string(&network.output(i)))?;
    }
    writeln!(w)?;
    for i in 0..network.nb_nodes() {
        let gate = network.gate(i);
        let rep = gate.dependencies().iter().map(sig_to_string).collect::<Vec<_>>().join(", ");
        write!(w, "x{} = ", i)?;
        match gate {
            Gate::Binary(_, crate::network::BinaryType::And) | Gate::Ternary(_, crate::network::TernaryType::And) => {
                writeln!(w, "AND({})", rep)?;
            }
            Gate::Binary(_, crate::network::BinaryType::Xor) | Gate::Ternary(_, crate::network::TernaryType::Xor) => {
                writeln!(w, "XOR({})", rep)?;
            }
            Gate::Nary(_, tp) => {
                let kw = match tp {
                    NaryType::And => "AND",
                    NaryType::Or => "OR",
                    NaryType::Nand => "NAND",
                    NaryType::Nor => "NOR",
                    NaryType::Xor => "XOR",
                    NaryType::Xnor => "XNOR",
                };
                writeln!(w, "{}({})", kw, rep)?;
            }
            Gate::Dff([d, res, en]) => {
                if *res != Signal::zero() || *en != Signal::one() {
                    writeln!(w, "DFFRSE({}, {}, gnd, {})", sig_to_string(d), sig_to_string(res), sig_to_string(en))?;
                } else {
                    writeln!(w, "DFF({})", sig_to_string(d))?;
                }
            }
            Gate::Ternary(_, crate::network::TernaryType::Mux) => {
                writeln!(w, "MUX({})", rep)?;
            }
            Gate::Ternary(_, crate::network::TernaryType::Maj) => {
                writeln!(w, "MAJ({})", rep)?;
            }
            Gate::Buf(s) => {
                if s.is_constant() {
                    writeln!(w, "{}", sig_to_string(s))?;
                } else if s.is_inverted() {
                    writeln!(w, "NOT({})", sig_to_string(&!*s))?;
                } else {
                    writeln!(w, "BUF({})", rep)?;
                }
            }
        }
    }

    for s in get_inverted_signals(network) {
        writeln!(w, "{}_n = NOT({})", sig_to_string(&s), sig_to_string(&s))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_readwrite() {
        let example = "# .bench (ISCAS) file
INPUT(i0)
INPUT(i1)

OUTPUT(x0)
OUTPUT(x1)
OUTPUT(x2)

x0 = AND(i0, i1)
x1 = NAND(i0, i1)
x2 = XOR(x0, x1)
x3 = gnd
x4 = vdd
";
        let net = read_bench(example.as_bytes()).unwrap();
        assert_eq!(net.nb_inputs(), 2);
        assert_eq!(net.nb_outputs(), 3);
        assert_eq!(net.nb_nodes(), 5);

        let mut buf = Vec::new();
        write_bench(&mut buf, &net).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("INPUT(i0)"));
    }

    #[test]
    fn test_dff_roundtrip() {
        let example = "INPUT(i0)
OUTPUT(x1)
x0 = DFF(i0)
x1 = BUF(x0)
";
        let net = read_bench(example.as_bytes()).unwrap();
        assert!(!net.is_comb());
    }
}
