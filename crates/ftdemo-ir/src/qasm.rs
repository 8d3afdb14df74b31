//! OpenQASM 2.0 emission.
//!
//! The target device accepts `OPENQASM 2.0` with `qelib1.inc`; every gate in
//! [`StandardGate`](crate::StandardGate) has a `qelib1` name, so no inline
//! gate definitions are needed.

use std::fmt::Write;

use crate::circuit::Circuit;
use crate::instruction::{Instruction, InstructionKind};

/// Emit a circuit as QASM 2.0 source code.
///
/// The statement count after the three declaration lines equals
/// [`Circuit::op_count`].
pub fn emit_qasm2(circuit: &Circuit) -> String {
    let mut out = String::new();
    out.push_str("OPENQASM 2.0;\n");
    out.push_str("include \"qelib1.inc\";\n");
    let _ = writeln!(out, "qreg q[{}];", circuit.num_qubits());
    let _ = writeln!(out, "creg c[{}];", circuit.num_clbits());

    for instruction in circuit.instructions() {
        emit_instruction(&mut out, instruction);
    }

    out
}

fn emit_instruction(out: &mut String, instruction: &Instruction) {
    let qubits = instruction
        .qubits
        .iter()
        .map(|q| format!("q[{}]", q.0))
        .collect::<Vec<_>>()
        .join(",");

    match instruction.kind {
        InstructionKind::Gate(gate) => {
            let _ = writeln!(out, "{} {qubits};", gate.name());
        }
        InstructionKind::Measure => {
            let clbits = instruction
                .clbits
                .iter()
                .map(|c| format!("c[{}]", c.0))
                .collect::<Vec<_>>()
                .join(",");
            let _ = writeln!(out, "measure {qubits} -> {clbits};");
        }
    }
}

/// Count the executable statements of a QASM 2.0 program.
///
/// Declarations (`OPENQASM`, `include`, `qreg`, `creg`) and blank lines are
/// not counted.
pub fn qasm_op_count(source: &str) -> usize {
    source
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| {
            !["OPENQASM", "include", "qreg", "creg"]
                .iter()
                .any(|kw| line.starts_with(kw))
        })
        .count()
}

impl Circuit {
    /// Emit this circuit as QASM 2.0 source code.
    pub fn to_qasm(&self) -> String {
        emit_qasm2(self)
    }
}
