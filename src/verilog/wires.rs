//! Implicit wire synthesis.
//!
//! The in-memory model lets assembly code alias two instance ports directly,
//! a convenience when stitching a hierarchy together. Verilog has no way to
//! express that alias unless one endpoint is a wire, a constant, or a
//! same-kind port of the enclosing hierarchy level; every other pairing needs
//! an explicitly named net between the two. This pass is the single place
//! that bridges the gap: it finds each inexpressible pairing among the
//! submodules of the module being emitted, inserts a mediating wire sized to
//! the port, and writes the wire's declaration to the output as it goes.
//!
//! The rewrite replaces the direct edge between the two endpoints with two
//! edges through the new wire, so both ends see the wire on any later read
//! within the same emission run. Mismatches are pairwise and local to one
//! submodule's port list, so a single pass over the submodules reaches the
//! fixpoint; running the pass again synthesises nothing.

use std::io::{self, Write};

use petgraph::graph::NodeIndex;

use crate::netlist::{Design, ModuleId, Net, PortKind};

/// Mediate every direct cross-instance port-to-port alias under `module`
/// with a named wire, writing each new declaration to `writer`.
///
/// Wire names are derived from the four identifiers involved,
/// `<instance>_<port>_TO_<peer instance>_<peer port>`, which makes them
/// unique within the emitting module's scope.
pub fn synthesise_wires<W: Write>(
    design: &mut Design,
    module: ModuleId,
    writer: &mut W,
) -> io::Result<()> {
    let submodules = design.module(module).submodules.clone();
    for sub in submodules {
        let ports = design.module(sub).ports.clone();
        for port in ports {
            if already_mediated(design, port) {
                continue;
            }
            let endpoints: Vec<NodeIndex> = design.connections(port).collect();
            for endpoint in endpoints {
                let peer = design.net(endpoint);
                match peer.kind() {
                    PortKind::Wire | PortKind::Constant => continue,
                    kind if kind == design.net(port).kind() => continue,
                    _ => {}
                }

                let wire_name = format!(
                    "{}_{}_TO_{}_{}",
                    design.module(sub).instance_name,
                    design.net(port).name(),
                    design.module(peer.scope()).instance_name,
                    peer.name(),
                );
                let wire = design.add_wire(module, &wire_name, design.net(port).width());
                design.mediate(port, endpoint, wire);
                writeln!(writer, "  {};", design.net(wire))?;
            }
        }
    }
    Ok(())
}

/// A port whose connections already resolve to a wire needs no repair.
fn already_mediated(design: &Design, port: NodeIndex) -> bool {
    design
        .connections(port)
        .any(|c| matches!(design.net(c), Net::Wire { .. }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::PortKind;

    /// Two siblings aliased port-to-port with differing kinds.
    fn sibling_design() -> (Design, ModuleId, NodeIndex, NodeIndex) {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let u0 = design.add_submodule(top, "Producer", "u0");
        let x = design.add_port(u0, "x", PortKind::Wire, 1);
        let u1 = design.add_submodule(top, "Consumer", "u1");
        let y = design.add_port(u1, "y", PortKind::Input, 1);
        design.connect(x, y).unwrap();
        (design, top, x, y)
    }

    #[test]
    fn sibling_alias_gets_one_wire() {
        let (mut design, top, x, y) = sibling_design();
        let mut out = Vec::new();
        synthesise_wires(&mut design, top, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "  wire u0_x_TO_u1_y;\n");

        // both endpoints now reach the wire, not each other
        for port in [x, y] {
            let ends: Vec<_> = design.connections(port).collect();
            assert_eq!(ends.len(), 1);
            assert!(matches!(design.net(ends[0]), Net::Wire { .. }));
        }
        assert_eq!(design.module(top).wires.len(), 1);
    }

    #[test]
    fn synthesised_wire_takes_the_port_width() {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let u0 = design.add_submodule(top, "Producer", "u0");
        let x = design.add_port(u0, "x", PortKind::Wire, 8);
        let u1 = design.add_submodule(top, "Consumer", "u1");
        let y = design.add_port(u1, "y", PortKind::Input, 8);
        design.connect(x, y).unwrap();

        let mut out = Vec::new();
        synthesise_wires(&mut design, top, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "  wire [7:0] u0_x_TO_u1_y;\n"
        );
    }

    #[test]
    fn pass_is_idempotent() {
        let (mut design, top, ..) = sibling_design();
        let mut first = Vec::new();
        synthesise_wires(&mut design, top, &mut first).unwrap();
        let wires_after_first = design.module(top).wires.len();

        let mut second = Vec::new();
        synthesise_wires(&mut design, top, &mut second).unwrap();

        assert!(second.is_empty());
        assert_eq!(design.module(top).wires.len(), wires_after_first);
    }

    #[test]
    fn same_kind_alias_needs_no_wire() {
        // an input aliased up to the parent's input is directly expressible
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let a = design.add_port(top, "a", PortKind::Input, 1);
        let sub = design.add_submodule(top, "Leaf", "u0");
        let p = design.add_port(sub, "p", PortKind::Input, 1);
        design.connect(p, a).unwrap();

        let mut out = Vec::new();
        synthesise_wires(&mut design, top, &mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(design.connections(p).collect::<Vec<_>>(), vec![a]);
    }

    #[test]
    fn constant_endpoint_needs_no_wire() {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let zero = design.add_port(top, "1'b0", PortKind::Constant, 1);
        let sub = design.add_submodule(top, "Leaf", "u0");
        let p = design.add_port(sub, "p", PortKind::Input, 1);
        design.connect(p, zero).unwrap();

        let mut out = Vec::new();
        synthesise_wires(&mut design, top, &mut out).unwrap();
        assert!(out.is_empty());
    }
}
