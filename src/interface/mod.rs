//! Interface recovery from existing Verilog source.
//!
//! The reverse path of the toolkit: given externally authored Verilog text,
//! recover the module's port and parameter lists, and only those. This is
//! what makes parameterizable generators possible when the leaf-node logic is
//! hand-written Verilog: the generator imports the leaf's interface, then
//! instantiates and wires it like any model-built module.
//!
//! # Scanner
//!
//! The scan is a single pass over physical lines with two states,
//! outside-module and inside-module. A line whose first token is `module`
//! enters the module and captures the declared type name; inside, a line
//! containing `parameter` yields a [`Param`], a line containing `input` or
//! `output` yields a [`PortDecl`], and the end token `);` leaves the module
//! and stops the scan. The module-start line itself contributes only the type
//! name; scanning resumes on the following line.
//!
//! # Known limitations
//!
//! Deliberately narrow, matching the emitter's output format rather than the
//! full language:
//!
//! - exactly one module per source text (anything after the first end token
//!   is ignored);
//! - one declaration per physical line;
//! - no `inout` recognition, no comment handling, no multi-line or computed
//!   bus-range expressions.
//!
//! Failures are loud: a missing or unterminated module and any recognised
//! declaration line the opaque constructors reject all abort the import.
//!
//! # Example
//!
//! ```
//! use vgen::interface::parse_interface;
//!
//! let interface = parse_interface(
//!     "module M ( a, b );\n  input a;\n  output [7:0] b;\n);\n",
//! )
//! .unwrap();
//!
//! assert_eq!(interface.class_name.as_ref(), "M");
//! assert_eq!(interface.port("b").unwrap().width, 8);
//! ```

use std::{error::Error, fmt, fs, io::BufWriter, path::PathBuf};

use anyhow::Result;
use clap::Parser;
use prettytable::*;
use std::collections::HashMap;

use crate::netlist::{Design, Param, PortDecl, Symbol};
use crate::verilog;

const START_TOKEN: &str = "module";
const END_TOKEN: &str = ");";

/// Error response of [`parse_interface`].
#[derive(Debug, PartialEq, Eq)]
pub enum ImportError {
    /// The source contains no module declaration at all.
    MissingModule,
    /// A module started but its end token never appeared before end of input.
    UnterminatedModule(Symbol),
    /// A `module` line with no type name after the keyword.
    MalformedModuleHeader { line: usize },
    /// A declaration keyword on a line the declaration constructors reject.
    MalformedDeclaration { line: usize, text: String },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::MissingModule => write!(f, "no module declaration found"),
            ImportError::UnterminatedModule(name) => {
                write!(f, "module `{}` is never closed by `);`", name)
            }
            ImportError::MalformedModuleHeader { line } => {
                write!(f, "line {}: module keyword without a module name", line)
            }
            ImportError::MalformedDeclaration { line, text } => {
                write!(f, "line {}: malformed declaration `{}`", line, text)
            }
        }
    }
}

impl Error for ImportError {}

/// A module's recovered port/parameter interface.
///
/// Ports are additionally addressable by name through [`Interface::port`],
/// the lookup the assembly layer uses when wiring an imported leaf module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    /// Declared type name captured from the module header.
    pub class_name: Symbol,
    pub params: Vec<Param>,
    pub ports: Vec<PortDecl>,
    by_name: HashMap<Symbol, usize>,
}

impl Interface {
    /// Look up a recovered port by name.
    pub fn port(&self, name: &str) -> Option<&PortDecl> {
        self.by_name
            .get(&Symbol::from(name))
            .map(|&ix| &self.ports[ix])
    }
}

/// Recover the first module interface found in `input`.
pub fn parse_interface(input: &str) -> Result<Interface, ImportError> {
    let mut class_name = None;
    let mut in_module = false;
    let mut params = Vec::new();
    let mut ports = Vec::new();

    for (number, line) in input.lines().enumerate() {
        if !in_module {
            let mut tokens = line.split_whitespace();
            if tokens.next() == Some(START_TOKEN) {
                let name = tokens
                    .next()
                    .ok_or(ImportError::MalformedModuleHeader { line: number + 1 })?;
                class_name = Some(Symbol::from(name.trim_end_matches([';', '(', ')'])));
                in_module = true;
            }
        } else if line.contains("parameter") {
            params.push(Param::parse(line).ok_or_else(|| malformed(number, line))?);
        } else if line.contains("input") || line.contains("output") {
            ports.push(PortDecl::parse(line).ok_or_else(|| malformed(number, line))?);
        } else if line.contains(END_TOKEN) {
            in_module = false;
            break;
        }
    }

    match (class_name, in_module) {
        (None, _) => Err(ImportError::MissingModule),
        (Some(name), true) => Err(ImportError::UnterminatedModule(name)),
        (Some(name), false) => {
            let by_name = ports
                .iter()
                .enumerate()
                .map(|(ix, p)| (p.name.clone(), ix))
                .collect();
            Ok(Interface {
                class_name: name,
                params,
                ports,
                by_name,
            })
        }
    }
}

fn malformed(number: usize, line: &str) -> ImportError {
    ImportError::MalformedDeclaration {
        line: number + 1,
        text: line.trim().to_string(),
    }
}

/// Command-line arguments for the interface command.
#[derive(Parser, Debug)]
pub struct InterfaceArgs {
    /// Verilog source file to recover the interface from
    pub input: PathBuf,

    /// Re-emit the recovered interface as a Verilog module stub
    #[clap(short, long)]
    pub output: Option<PathBuf>,
}

/// Recover a module interface from a Verilog file and report it.
///
/// Prints the recovered parameters and ports as tables on stdout; with
/// `--output`, additionally rebuilds a one-module design from the interface
/// and emits it as a Verilog stub, exercising the forward path end to end.
pub fn interface_main(args: InterfaceArgs) -> Result<()> {
    let InterfaceArgs { input, output } = args;

    let interface = crate::read_file(&input)?;

    println!("Module {}", interface.class_name);

    if !interface.params.is_empty() {
        let mut table = Table::new();
        table.set_titles(row!["Parameter", "Value"]);
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        for param in &interface.params {
            table.add_row(row![param.name, param.value]);
        }
        table.printstd();
    }

    let mut table = Table::new();
    table.set_titles(row!["Direction", "Name", "Width"]);
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    for port in &interface.ports {
        table.add_row(row![port.kind, port.name, port.width]);
    }
    table.printstd();

    if let Some(output) = output {
        let (mut design, module) = Design::from_interface(&interface);
        let mut writer = BufWriter::new(fs::File::create(&output)?);
        verilog::write_module(&mut design, module, &mut writer)?;
    }

    Ok(())
}
