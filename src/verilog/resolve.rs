//! Resolution of port-map references during instantiation emission.
//!
//! A port of a submodule instance may be connected both to an endpoint in the
//! instantiating module's scope (the reference the instantiation line needs)
//! and to endpoints in sibling or child scopes (the port's own internal
//! wiring). Which one is "the" reference is therefore not a global property
//! of the port but depends on who is asking: resolution happens per call
//! site, from the point of view of the module currently being emitted.

use std::{error::Error, fmt};

use petgraph::graph::NodeIndex;

use crate::netlist::{Design, Symbol};

/// Error response of [`instance_reference`].
#[derive(Debug, PartialEq, Eq)]
pub enum ResolveError {
    /// A port with several connections has none in the instantiating scope.
    NoParentEndpoint { instance: Symbol, port: Symbol },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::NoParentEndpoint { instance, port } => write!(
                f,
                "no endpoint in the instantiating scope among the connections of `{}.{}`",
                instance, port
            ),
        }
    }
}

impl Error for ResolveError {}

/// The textual reference for `port` in its instantiation's port map, as seen
/// from the instantiating module's scope.
///
/// - An unconnected port resolves to `None` and is emitted blank.
/// - A port with exactly one connection resolves to that endpoint's name.
/// - A port with several connections resolves to the one endpoint owned by
///   the parent of the port's owning module, i.e. the endpoint visible in the
///   scope being emitted. If no connection qualifies the design is ambiguous
///   and resolution fails; guessing here would silently wire the instance to
///   a net from the wrong hierarchy level.
pub fn instance_reference(
    design: &Design,
    port: NodeIndex,
) -> Result<Option<Symbol>, ResolveError> {
    let endpoints: Vec<NodeIndex> = design.connections(port).collect();
    match endpoints.as_slice() {
        [] => Ok(None),
        [single] => Ok(Some(design.net(*single).name().clone())),
        several => {
            let owner = design.net(port).scope();
            let emitting_scope = design.module(owner).parent;
            for &c in several {
                if Some(design.net(c).scope()) == emitting_scope {
                    return Ok(Some(design.net(c).name().clone()));
                }
            }
            Err(ResolveError::NoParentEndpoint {
                instance: design.module(owner).instance_name.clone(),
                port: design.net(port).name().clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::PortKind;

    /// top ── mid ── leaf, with mid's port wired both up and down.
    fn three_level_design() -> (Design, NodeIndex, NodeIndex, NodeIndex) {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let clk = design.add_port(top, "clk", PortKind::Input, 1);
        let mid = design.add_submodule(top, "Mid", "m0");
        let c = design.add_port(mid, "c", PortKind::Input, 1);
        let leaf = design.add_submodule(mid, "Leaf", "l0");
        let d = design.add_port(leaf, "d", PortKind::Input, 1);
        design.connect(c, clk).unwrap();
        design.connect(c, d).unwrap();
        (design, clk, c, d)
    }

    #[test]
    fn unconnected_port_resolves_blank() {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let sub = design.add_submodule(top, "Leaf", "u0");
        let p = design.add_port(sub, "p", PortKind::Input, 1);

        assert_eq!(instance_reference(&design, p), Ok(None));
    }

    #[test]
    fn single_connection_resolves_directly() {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let clk = design.add_port(top, "clk", PortKind::Input, 1);
        let sub = design.add_submodule(top, "Leaf", "u0");
        let p = design.add_port(sub, "p", PortKind::Input, 1);
        design.connect(p, clk).unwrap();

        let reference = instance_reference(&design, p).unwrap().unwrap();
        assert_eq!(reference.as_ref(), "clk");
    }

    #[test]
    fn multiple_connections_pick_the_instantiating_scope() {
        let (design, _clk, c, d) = three_level_design();

        // mid.c seen from top must resolve to top's clk, not leaf's d
        let reference = instance_reference(&design, c).unwrap().unwrap();
        assert_eq!(reference.as_ref(), "clk");

        // leaf.d has a single connection and resolves to c regardless of scope
        let reference = instance_reference(&design, d).unwrap().unwrap();
        assert_eq!(reference.as_ref(), "c");
    }

    #[test]
    fn ambiguous_connections_are_an_error() {
        let mut design = Design::new();
        let top = design.add_module("Top", "top");
        let mid = design.add_submodule(top, "Mid", "m0");
        let c = design.add_port(mid, "c", PortKind::Input, 1);
        // both endpoints live below the instantiating scope
        let leaf0 = design.add_submodule(mid, "Leaf", "l0");
        let d0 = design.add_port(leaf0, "d0", PortKind::Input, 1);
        let leaf1 = design.add_submodule(mid, "Leaf", "l1");
        let d1 = design.add_port(leaf1, "d1", PortKind::Input, 1);
        design.connect(c, d0).unwrap();
        design.connect(c, d1).unwrap();

        assert_eq!(
            instance_reference(&design, c),
            Err(ResolveError::NoParentEndpoint {
                instance: Symbol::from("m0"),
                port: Symbol::from("c"),
            })
        );
    }
}
