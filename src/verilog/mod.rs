//! Verilog emission for hierarchical netlists.
//!
//! [`write_module`] turns one [`Module`](crate::netlist::Module) of a
//! [`Design`] into a complete synthesizable declaration. The sections appear
//! in a fixed order:
//!
//! 1. `module <name>` header
//! 2. `#( … )` parameter header, when the module has parameters
//! 3. `( … );` port list, when the module has ports; entries are
//!    comma-separated with no trailing comma
//! 4. implicit-wire declarations, written by the [`wires`] pass as it repairs
//!    direct cross-instance aliases
//! 5. one instantiation block per submodule, with named-port association
//!    resolved per call site by [`resolve`]
//! 6. the translated combinational logic
//! 7. `endmodule`
//!
//! Empty parameter and port sections are omitted outright rather than
//! producing a malformed empty list; a module with neither emits
//! `module <name>;`. Parameters go in an ANSI header before the port list so that a
//! recovered interface keeps them (the importer stops scanning at the `);`
//! that closes the header).
//!
//! Emission either completes or fails as a whole; on failure the partial text
//! written so far is not usable and callers should discard it.
//!
//! # Example
//!
//! ```
//! use vgen::expr::{LogicBlock, Stmt, ops::name};
//! use vgen::netlist::{Design, PortKind};
//! use vgen::verilog::write_module;
//!
//! let mut design = Design::new();
//! let top = design.add_module("Sum", "sum0");
//! design.add_port(top, "a", PortKind::Input, 1);
//! design.add_port(top, "b", PortKind::Input, 1);
//! design.add_port(top, "sum", PortKind::Output, 1);
//! let mut block = LogicBlock::combinational("add");
//! block.stmts.push(Stmt::assign("sum", name("a") + name("b")));
//! design.add_block(top, block);
//!
//! let mut out = Vec::new();
//! write_module(&mut design, top, &mut out).unwrap();
//! ```

pub mod resolve;
pub mod wires;


use std::{
    error::Error,
    fmt,
    io::{self, Write},
};

use itertools::Itertools;

use crate::{
    expr::{self, TranslateError},
    netlist::{Design, ModuleId},
};
use self::resolve::ResolveError;

/// Error response of module emission.
#[derive(Debug)]
pub enum EmitError {
    Io(io::Error),
    Resolve(ResolveError),
    Translate(TranslateError),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::Io(err) => write!(f, "{}", err),
            EmitError::Resolve(err) => write!(f, "{}", err),
            EmitError::Translate(err) => write!(f, "{}", err),
        }
    }
}

impl Error for EmitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EmitError::Io(err) => Some(err),
            EmitError::Resolve(err) => Some(err),
            EmitError::Translate(err) => Some(err),
        }
    }
}

impl From<io::Error> for EmitError {
    fn from(err: io::Error) -> Self {
        EmitError::Io(err)
    }
}

impl From<ResolveError> for EmitError {
    fn from(err: ResolveError) -> Self {
        EmitError::Resolve(err)
    }
}

impl From<TranslateError> for EmitError {
    fn from(err: TranslateError) -> Self {
        EmitError::Translate(err)
    }
}

/// Emit the complete Verilog declaration of `module` into `writer`.
///
/// The design is mutated: repairing inexpressible port-to-port aliases
/// inserts mediating wires into `module`'s scope (see [`wires`]).
pub fn write_module<W: Write>(
    design: &mut Design,
    module: ModuleId,
    writer: &mut W,
) -> Result<(), EmitError> {
    write_header(design, module, writer)?;
    wires::synthesise_wires(design, module, writer)?;
    write_instances(design, module, writer)?;
    write_logic(design, module, writer)?;
    writeln!(writer)?;
    writeln!(writer, "endmodule")?;
    Ok(())
}

fn write_header<W: Write>(design: &Design, module: ModuleId, writer: &mut W) -> io::Result<()> {
    let m = design.module(module);
    if m.params.is_empty() && m.ports.is_empty() {
        writeln!(writer, "module {};", m.class_name)?;
    } else {
        writeln!(writer, "module {}", m.class_name)?;
        if !m.params.is_empty() {
            writeln!(writer, "#(")?;
            let entries = m.params.iter().map(|p| format!("  {}", p)).join(",\n");
            writeln!(writer, "{}", entries)?;
            writeln!(writer, "{}", if m.ports.is_empty() { ");" } else { ")" })?;
        }
        if !m.ports.is_empty() {
            writeln!(writer, "(")?;
            let entries = m
                .ports
                .iter()
                .map(|&p| format!("  {}", design.net(p)))
                .join(",\n");
            writeln!(writer, "{}", entries)?;
            writeln!(writer, ");")?;
        }
    }
    writeln!(writer)
}

fn write_instances<W: Write>(
    design: &Design,
    module: ModuleId,
    writer: &mut W,
) -> Result<(), EmitError> {
    for &sub in &design.module(module).submodules {
        let s = design.module(sub);
        writeln!(writer)?;
        if s.ports.is_empty() {
            writeln!(writer, "  {} {};", s.class_name, s.instance_name)?;
            continue;
        }
        writeln!(writer, "  {} {}", s.class_name, s.instance_name)?;
        writeln!(writer, "  (")?;
        let mut entries = Vec::new();
        for &port in &s.ports {
            let reference = resolve::instance_reference(design, port)?;
            entries.push(format!(
                "    .{} ({})",
                design.net(port).name(),
                reference.as_ref().map(|r| r.as_ref()).unwrap_or(""),
            ));
        }
        writeln!(writer, "{}", entries.iter().join(",\n"))?;
        writeln!(writer, "  );")?;
    }
    Ok(())
}

fn write_logic<W: Write>(
    design: &Design,
    module: ModuleId,
    writer: &mut W,
) -> Result<(), EmitError> {
    for block in &design.module(module).blocks {
        if !block.is_combinational() {
            continue;
        }
        write!(writer, "{}", expr::render_block(block)?)?;
    }
    Ok(())
}
