// Copyright 2026 Evonet Contributors
// SPDX-License-Identifier: Apache-2.0

//! C emission: render a lowered [`Program`] into a standalone C source
//! file whose `main` reads one positional argument per input neuron and
//! prints one whitespace-separated value per output neuron.

use std::fmt::Write;

use crate::ir::{NeuronExpr, OutputValue, Program, Statement};

/// Renders emit IR to C source text.
///
/// Runtime inputs arrive as `argv[1..]`, so an input at height `h` reads
/// `argv[h + 1]`. All literals are printed with six fractional digits,
/// matching the argument formatting used by the compiler bridge.
#[derive(Debug, Default)]
pub struct CEmitter;

impl CEmitter {
    pub fn new() -> Self {
        Self
    }

    pub fn emit(&self, program: &Program) -> String {
        let mut out = String::new();
        out.push_str("#include <math.h>\n");
        out.push_str("#include <stdio.h>\n");
        out.push_str("#include <stdlib.h>\n\n");

        out.push_str("static double activator(double x) {\n");
        let _ = writeln!(out, "    {}", program.activation.c_body());
        out.push_str("}\n\n");

        out.push_str("int main(int argc, char **argv) {\n");
        let _ = writeln!(out, "    (void)argc;");
        for statement in &program.statements {
            self.emit_statement(&mut out, statement);
        }
        for output in &program.outputs {
            match output {
                OutputValue::Zero => {
                    let _ = writeln!(out, "    printf(\"%f \", 0.0);");
                }
                OutputValue::Literal(value) => {
                    let _ = writeln!(out, "    printf(\"%f \", {value:.6});");
                }
                OutputValue::Var(var) => {
                    let _ = writeln!(out, "    printf(\"%f \", {var});");
                }
            }
        }
        out.push_str("    printf(\"\\n\");\n");
        out.push_str("    return 0;\n");
        out.push_str("}\n");
        out
    }

    fn emit_statement(&self, out: &mut String, statement: &Statement) {
        match &statement.expr {
            NeuronExpr::Input { height, bias } => {
                let _ = writeln!(
                    out,
                    "    const double {} = activator({:.6} + atof(argv[{}]));",
                    statement.var,
                    bias,
                    height + 1
                );
            }
            NeuronExpr::Sum { constant, terms } => {
                let mut parts = vec![format!("{constant:.6}")];
                for term in terms {
                    parts.push(format!("{:.6} * {}", term.weight, term.var));
                }
                let _ = writeln!(
                    out,
                    "    const double {} = activator({});",
                    statement.var,
                    parts.join(" + ")
                );
            }
        }
    }
}
