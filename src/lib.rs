//! Verilog generation and interface recovery for hierarchical netlist models
//!
//! This library is the translation layer between an in-memory hierarchical
//! circuit description and synthesizable Verilog text. Simulation frameworks
//! build the description (modules, ports, parameters, connections, and small
//! combinational logic trees) and this crate turns it into module
//! declarations; in the reverse direction it recovers a module's
//! port/parameter interface from existing Verilog source, so generators can
//! wrap hand-written leaf modules.
//!
//! # Main Workflows
//!
//! 1. **Emission** ([`verilog`]): translate one module of a [`Design`] into a
//!    complete Verilog declaration, repairing direct port-to-port aliases
//!    with named wires and resolving each instantiation reference from the
//!    emitting module's point of view.
//! 2. **Interface recovery** ([`interface`]): scan Verilog source for a
//!    module's parameter and port declarations and expose them for lookup by
//!    name.
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use vgen::{Design, read_file, verilog::write_module};
//!
//! // Recover the interface of a hand-written leaf module
//! let interface = read_file(Path::new("fifo.v"))?;
//!
//! // Rebuild it as a model and emit a stub
//! let (mut design, module) = Design::from_interface(&interface);
//! let mut out = Vec::new();
//! write_module(&mut design, module, &mut out)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`netlist`]**: the design model: module tree, ports, wires,
//!   parameters, and the connectivity graph layered over the tree
//! - **[`expr`]**: typed combinational statement trees and their translation
//!   to `assign` text
//! - **[`verilog`]**: the forward emitter, with implicit-wire synthesis and
//!   per-scope reference resolution
//! - **[`interface`]**: the reverse path, recovering interfaces from source
//!
//! # Re-exports
//!
//! The commonly used model types ([`Design`], [`ModuleId`], [`PortKind`],
//! [`Param`], [`PortDecl`], [`Symbol`]) and the [`Interface`] result are
//! re-exported at the crate root.

use anyhow::Result;
use clap::Parser;
use std::{fs, path::Path};

pub mod expr;
pub mod interface;
pub mod netlist;
pub mod verilog;

pub use interface::{Interface, InterfaceArgs, interface_main};
pub use netlist::{Design, ModuleId, Param, PortDecl, PortKind, Symbol};

/// Reads and recovers a module interface from a Verilog source file.
///
/// Convenience wrapper over [`interface::parse_interface`] for callers that
/// start from a file on disk.
///
/// # Example
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use std::path::Path;
/// use vgen::read_file;
///
/// let interface = read_file(Path::new("fifo.v"))?;
/// # Ok(())
/// # }
/// ```
pub fn read_file(file_name: &Path) -> Result<Interface> {
    let file = fs::read_to_string(file_name)?;
    Ok(interface::parse_interface(&file)?)
}

/// Command-line interface arguments for the vgen tools.
#[derive(Debug, Parser)]
#[clap(
    name = "Vgen Tools",
    about = "Verilog generation and interface recovery tools"
)]
pub enum CLIArguments {
    /// Recover a module's port and parameter interface from Verilog source.
    Interface(InterfaceArgs),
}
