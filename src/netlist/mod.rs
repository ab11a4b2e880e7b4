//! Hierarchical netlist model and construction API.
//!
//! This module provides the data structures shared by the Verilog emitter and
//! the interface importer: a tree of [`Module`]s, the ports and wires attached
//! to them, and the connectivity graph layered over the tree.
//!
//! # Representation
//!
//! The module hierarchy is a tree held in an arena (`Vec<Module>` indexed by
//! [`ModuleId`]): the root module has no parent and every submodule instance is
//! owned by exactly one parent. The connectivity between ports is **not** a
//! tree (a port may simultaneously reach an endpoint in its parent's scope
//! and one in a sibling's or child's scope), so connections live in a separate
//! undirected [`StableUnGraph`] whose node weights are the endpoints
//! ([`Net::Port`] and [`Net::Wire`]) and whose edges are the connections.
//! A port's connection list is its neighbourhood in that graph, and the stable
//! node indices double as design-wide endpoint handles.
//!
//! # Construction
//!
//! [`Design`] exposes the builder API consumed by circuit-assembly code:
//!
//! ```
//! use vgen::netlist::{Design, PortKind};
//!
//! let mut design = Design::new();
//! let top = design.add_module("Sum", "sum0");
//! let a = design.add_port(top, "a", PortKind::Input, 1);
//! let sub = design.add_submodule(top, "Stage", "u0");
//! let x = design.add_port(sub, "x", PortKind::Input, 1);
//! design.connect(a, x).unwrap();
//! ```
//!
//! No structural validation happens at construction time beyond the one
//! enforced invariant: connected endpoints must agree on bit width
//! ([`ModelError::WidthMismatch`]). Everything else is the business of the
//! emission passes. After construction the model is read-mostly; the only
//! later mutation is the wire-mediation rewrite used by the emitter.

use std::{error::Error, fmt};

use lazy_static::lazy_static;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableUnGraph;
use regex::Regex;
use string_cache::DefaultAtom;

use crate::expr::LogicBlock;
use crate::interface::Interface;

pub type Symbol = DefaultAtom;

/// Index of a module in the design arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

/// Direction/kind tag of a connection endpoint.
///
/// Every port carries one of these; wire endpoints always report
/// [`PortKind::Wire`]. The set is closed on purpose: the synthesis pass and
/// the emitter match on it exhaustively, so a new kind cannot be added without
/// the compiler pointing at every place that must handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    Input,
    Output,
    Inout,
    Wire,
    Constant,
}

impl PortKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            PortKind::Input => "input",
            PortKind::Output => "output",
            PortKind::Inout => "inout",
            PortKind::Wire => "wire",
            PortKind::Constant => "constant",
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A connection endpoint in the design-wide net graph.
///
/// Ports belong to the module they terminate on; wires belong to the scope
/// (module body) that declares them. Both are referenced from elsewhere only
/// through their stable graph index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Net {
    Port {
        name: Symbol,
        width: u32,
        kind: PortKind,
        module: ModuleId,
    },
    Wire {
        name: Symbol,
        width: u32,
        scope: ModuleId,
    },
}

impl Net {
    pub fn name(&self) -> &Symbol {
        match self {
            Net::Port { name, .. } => name,
            Net::Wire { name, .. } => name,
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Net::Port { width, .. } => *width,
            Net::Wire { width, .. } => *width,
        }
    }

    /// The kind tag used by the mediation rules; wires are always `Wire`.
    pub fn kind(&self) -> PortKind {
        match self {
            Net::Port { kind, .. } => *kind,
            Net::Wire { .. } => PortKind::Wire,
        }
    }

    /// The module this endpoint is visible in: a port's terminal module, or
    /// the scope a wire is declared in.
    pub fn scope(&self) -> ModuleId {
        match self {
            Net::Port { module, .. } => *module,
            Net::Wire { scope, .. } => *scope,
        }
    }
}

fn write_range(f: &mut fmt::Formatter<'_>, width: u32) -> fmt::Result {
    if width > 1 {
        write!(f, "[{}:0] ", width - 1)
    } else {
        Ok(())
    }
}

impl fmt::Display for Net {
    /// Declaration text: `input [7:0] addr` for ports, `wire carry` for wires.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Net::Port {
                name, width, kind, ..
            } => {
                write!(f, "{} ", kind.keyword())?;
                write_range(f, *width)?;
                write!(f, "{}", name)
            }
            Net::Wire { name, width, .. } => {
                f.write_str("wire ")?;
                write_range(f, *width)?;
                write!(f, "{}", name)
            }
        }
    }
}

/// A named constant configuring a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Symbol,
    pub value: Symbol,
}

impl Param {
    /// Construct a parameter from a single declaration line.
    ///
    /// The line layout (`parameter <name> = <value>`) is treated as opaque
    /// here; anything before the keyword and any trailing `,`/`;` is ignored.
    /// Returns `None` when the line does not contain a parameter declaration.
    pub fn parse(line: &str) -> Option<Param> {
        lazy_static! {
            static ref PARAM_RE: Regex =
                Regex::new(r"parameter\s+([A-Za-z_][A-Za-z0-9_$]*)\s*=\s*([^,;]+)").unwrap();
        }

        let c = PARAM_RE.captures(line)?;
        Some(Param {
            name: Symbol::from(&c[1]),
            value: Symbol::from(c[2].trim()),
        })
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parameter {} = {}", self.name, self.value)
    }
}

/// A free-standing port declaration, as recovered by the interface importer.
///
/// Unlike [`Net::Port`] this is not attached to any design; it is the exchange
/// value between the importer and whatever constructs a [`Module`] from the
/// recovered interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortDecl {
    pub name: Symbol,
    pub width: u32,
    pub kind: PortKind,
}

impl PortDecl {
    /// Construct a port declaration from a single line of Verilog.
    ///
    /// Accepts `input`/`output`/`inout`, an optional `[msb:lsb]` range with
    /// numeric bounds, and the port identifier; the width is `msb - lsb + 1`,
    /// or 1 when no range is present. Returns `None` for anything else;
    /// multi-line declarations and computed range expressions are not
    /// understood.
    pub fn parse(line: &str) -> Option<PortDecl> {
        lazy_static! {
            static ref PORT_RE: Regex = Regex::new(
                r"(input|output|inout)\s+(?:\[\s*(\d+)\s*:\s*(\d+)\s*\]\s*)?([A-Za-z_][A-Za-z0-9_$]*)"
            )
            .unwrap();
        }

        let c = PORT_RE.captures(line)?;
        let kind = match &c[1] {
            "input" => PortKind::Input,
            "output" => PortKind::Output,
            _ => PortKind::Inout,
        };
        let width = match (c.get(2), c.get(3)) {
            (Some(msb), Some(lsb)) => {
                let msb: u32 = msb.as_str().parse().ok()?;
                let lsb: u32 = lsb.as_str().parse().ok()?;
                msb.checked_sub(lsb)? + 1
            }
            _ => 1,
        };
        Some(PortDecl {
            name: Symbol::from(&c[4]),
            width,
            kind,
        })
    }
}

impl fmt::Display for PortDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind.keyword())?;
        write_range(f, self.width)?;
        write!(f, "{}", self.name)
    }
}

/// One hardware-design unit, leaf or hierarchical.
///
/// `class_name` is the declared type emitted in the module header;
/// `instance_name` identifies this instantiation within its parent. Ports and
/// wires are stable indices into the design's net graph; submodules are arena
/// ids. All lists keep construction order, which is also emission order.
#[derive(Debug, Clone)]
pub struct Module {
    pub class_name: Symbol,
    pub instance_name: Symbol,
    pub parent: Option<ModuleId>,
    pub ports: Vec<NodeIndex>,
    pub wires: Vec<NodeIndex>,
    pub params: Vec<Param>,
    pub submodules: Vec<ModuleId>,
    pub blocks: Vec<LogicBlock>,
}

/// Error response of the construction API.
#[derive(Debug, PartialEq, Eq)]
pub enum ModelError {
    /// Two endpoints of differing bit width were connected.
    WidthMismatch {
        a: Symbol,
        a_width: u32,
        b: Symbol,
        b_width: u32,
    },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::WidthMismatch {
                a,
                a_width,
                b,
                b_width,
            } => write!(
                f,
                "width mismatch: cannot connect `{}` ({} bits) to `{}` ({} bits)",
                a, a_width, b, b_width
            ),
        }
    }
}

impl Error for ModelError {}

/// The whole design: module arena plus the endpoint/connection graph.
#[derive(Debug, Clone)]
pub struct Design {
    graph: StableUnGraph<Net, ()>,
    modules: Vec<Module>,
}

impl Default for Design {
    fn default() -> Self {
        Design::new()
    }
}

impl Design {
    pub fn new() -> Design {
        Design {
            graph: StableUnGraph::with_capacity(0, 0),
            modules: Vec::new(),
        }
    }

    /// Add a root module (no parent).
    pub fn add_module(&mut self, class_name: &str, instance_name: &str) -> ModuleId {
        let id = ModuleId(self.modules.len());
        self.modules.push(Module {
            class_name: Symbol::from(class_name),
            instance_name: Symbol::from(instance_name),
            parent: None,
            ports: Vec::new(),
            wires: Vec::new(),
            params: Vec::new(),
            submodules: Vec::new(),
            blocks: Vec::new(),
        });
        id
    }

    /// Add a submodule instance owned by `parent`.
    pub fn add_submodule(
        &mut self,
        parent: ModuleId,
        class_name: &str,
        instance_name: &str,
    ) -> ModuleId {
        let id = self.add_module(class_name, instance_name);
        self.modules[id.0].parent = Some(parent);
        self.modules[parent.0].submodules.push(id);
        id
    }

    /// Add a port terminal to `module` and return its endpoint index.
    pub fn add_port(
        &mut self,
        module: ModuleId,
        name: &str,
        kind: PortKind,
        width: u32,
    ) -> NodeIndex {
        let ix = self.graph.add_node(Net::Port {
            name: Symbol::from(name),
            width,
            kind,
            module,
        });
        self.modules[module.0].ports.push(ix);
        ix
    }

    /// Declare a named wire in `module`'s scope and return its endpoint index.
    pub fn add_wire(&mut self, module: ModuleId, name: &str, width: u32) -> NodeIndex {
        let ix = self.graph.add_node(Net::Wire {
            name: Symbol::from(name),
            width,
            scope: module,
        });
        self.modules[module.0].wires.push(ix);
        ix
    }

    pub fn add_param(&mut self, module: ModuleId, name: &str, value: &str) {
        self.modules[module.0].params.push(Param {
            name: Symbol::from(name),
            value: Symbol::from(value),
        });
    }

    pub fn add_block(&mut self, module: ModuleId, block: LogicBlock) {
        self.modules[module.0].blocks.push(block);
    }

    /// Connect two endpoints.
    ///
    /// Connected endpoints must agree on bit width; a mismatch is rejected
    /// with [`ModelError::WidthMismatch`] instead of surfacing later as
    /// malformed output.
    pub fn connect(&mut self, a: NodeIndex, b: NodeIndex) -> Result<(), ModelError> {
        let (na, nb) = (&self.graph[a], &self.graph[b]);
        if na.width() != nb.width() {
            return Err(ModelError::WidthMismatch {
                a: na.name().clone(),
                a_width: na.width(),
                b: nb.name().clone(),
                b_width: nb.width(),
            });
        }
        self.graph.add_edge(a, b, ());
        Ok(())
    }

    /// Replace the direct connection `a`–`b` with `a`–`wire` and `b`–`wire`.
    ///
    /// Other connections of either endpoint are left intact. This is the one
    /// post-construction mutation of the model, owned by the wire-synthesis
    /// pass; the single undirected edge makes the rewrite atomic with respect
    /// to any read that follows in the same pass.
    pub fn mediate(&mut self, a: NodeIndex, b: NodeIndex, wire: NodeIndex) {
        if let Some(edge) = self.graph.find_edge(a, b) {
            self.graph.remove_edge(edge);
        }
        self.graph.add_edge(a, wire, ());
        self.graph.add_edge(b, wire, ());
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn net(&self, ix: NodeIndex) -> &Net {
        &self.graph[ix]
    }

    /// The connection endpoints of `net`, i.e. its graph neighbourhood.
    pub fn connections(&self, net: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors(net)
    }

    /// Build a single leaf module out of a recovered [`Interface`].
    ///
    /// This is the consuming side of the importer: the recovered ports and
    /// parameters become a fresh, unconnected module, ready for instantiation
    /// bookkeeping or stub emission.
    pub fn from_interface(interface: &Interface) -> (Design, ModuleId) {
        let mut design = Design::new();
        let module = design.add_module(interface.class_name.as_ref(), interface.class_name.as_ref());
        for param in &interface.params {
            design.add_param(module, param.name.as_ref(), param.value.as_ref());
        }
        for port in &interface.ports {
            design.add_port(module, port.name.as_ref(), port.kind, port.width);
        }
        (design, module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_is_a_tree() {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let u0 = design.add_submodule(top, "Leaf", "u0");
        let u1 = design.add_submodule(top, "Leaf", "u1");

        assert_eq!(design.module(top).parent, None);
        assert_eq!(design.module(u0).parent, Some(top));
        assert_eq!(design.module(u1).parent, Some(top));
        assert_eq!(design.module(top).submodules, vec![u0, u1]);
    }

    #[test]
    fn connect_appends_to_both_endpoints() {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let a = design.add_port(top, "a", PortKind::Input, 1);
        let b = design.add_port(top, "b", PortKind::Output, 1);
        design.connect(a, b).unwrap();

        assert_eq!(design.connections(a).collect::<Vec<_>>(), vec![b]);
        assert_eq!(design.connections(b).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn connect_rejects_width_mismatch() {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let narrow = design.add_port(top, "narrow", PortKind::Input, 1);
        let wide = design.add_port(top, "wide", PortKind::Output, 8);

        let result = design.connect(narrow, wide);
        assert!(matches!(
            result,
            Err(ModelError::WidthMismatch {
                a_width: 1,
                b_width: 8,
                ..
            })
        ));
        assert_eq!(design.connections(narrow).count(), 0);
    }

    #[test]
    fn mediate_replaces_only_the_shared_edge() {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let a = design.add_port(top, "a", PortKind::Input, 1);
        let b = design.add_port(top, "b", PortKind::Output, 1);
        let c = design.add_port(top, "c", PortKind::Input, 1);
        design.connect(a, b).unwrap();
        design.connect(b, c).unwrap();

        let wire = design.add_wire(top, "a_TO_b", 1);
        design.mediate(a, b, wire);

        assert_eq!(design.connections(a).collect::<Vec<_>>(), vec![wire]);
        let b_ends: Vec<_> = design.connections(b).collect();
        assert!(b_ends.contains(&wire));
        assert!(b_ends.contains(&c));
        assert!(!b_ends.contains(&a));
    }

    #[test]
    fn port_decl_parse() {
        let p = PortDecl::parse("  input a,").unwrap();
        assert_eq!(p.name.as_ref(), "a");
        assert_eq!(p.width, 1);
        assert_eq!(p.kind, PortKind::Input);

        let p = PortDecl::parse("output [7:0] b;").unwrap();
        assert_eq!(p.name.as_ref(), "b");
        assert_eq!(p.width, 8);
        assert_eq!(p.kind, PortKind::Output);

        let p = PortDecl::parse("inout [3:2] pad").unwrap();
        assert_eq!(p.width, 2);
        assert_eq!(p.kind, PortKind::Inout);

        assert_eq!(PortDecl::parse("wire x;"), None);
        // reversed range bounds are malformed, not width zero
        assert_eq!(PortDecl::parse("input [0:7] x"), None);
    }

    #[test]
    fn port_decl_display_round_trips() {
        for text in ["input a", "output [7:0] b", "inout [15:0] pad"] {
            let decl = PortDecl::parse(text).unwrap();
            assert_eq!(decl.to_string(), text);
        }
    }

    #[test]
    fn param_parse() {
        let p = Param::parse("  parameter WIDTH = 32,").unwrap();
        assert_eq!(p.name.as_ref(), "WIDTH");
        assert_eq!(p.value.as_ref(), "32");
        assert_eq!(p.to_string(), "parameter WIDTH = 32");

        assert_eq!(Param::parse("input a;"), None);
    }
}
