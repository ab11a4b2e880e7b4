//! Operator overloading for building expression trees
//!
//! This module lets assembly code build [`Expr`] trees using natural
//! arithmetic notation instead of nested constructor calls.
//!
//! # Expression Building
//!
//! ```
//! use vgen::expr::ops::name;
//!
//! // All of these work naturally:
//! let sum = name("a") + name("b");
//! let masked = (name("a") + name("b")) & name("mask");
//! let scaled = name("x") << name("shift");
//! ```
//!
//! Comparisons cannot be overloaded (`==` must return `bool` in Rust), so
//! they go through [`Expr::binary`] with the comparison operator spelled out:
//!
//! ```
//! use vgen::expr::{BinOp, Expr, ops::name};
//!
//! let is_zero = Expr::binary(BinOp::Eq, name("count"), name("zero"));
//! ```

use super::{BinOp, Expr};
use crate::netlist::Symbol;

/// A name-reference leaf.
pub fn name(n: &str) -> Expr {
    Expr::Name(Symbol::from(n))
}

// ============================================================================
// Arithmetic operators
// ============================================================================

impl std::ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Add, self, rhs)
    }
}

impl std::ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Sub, self, rhs)
    }
}

impl std::ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Mul, self, rhs)
    }
}

impl std::ops::Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Div, self, rhs)
    }
}

impl std::ops::Rem for Expr {
    type Output = Expr;

    fn rem(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Mod, self, rhs)
    }
}

// ============================================================================
// Shift operators
// ============================================================================

impl std::ops::Shl for Expr {
    type Output = Expr;

    fn shl(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Shl, self, rhs)
    }
}

impl std::ops::Shr for Expr {
    type Output = Expr;

    fn shr(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::Shr, self, rhs)
    }
}

// ============================================================================
// Bitwise operators
// ============================================================================

impl std::ops::BitAnd for Expr {
    type Output = Expr;

    fn bitand(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::BitAnd, self, rhs)
    }
}

impl std::ops::BitOr for Expr {
    type Output = Expr;

    fn bitor(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::BitOr, self, rhs)
    }
}

impl std::ops::BitXor for Expr {
    type Output = Expr;

    fn bitxor(self, rhs: Expr) -> Expr {
        Expr::binary(BinOp::BitXor, self, rhs)
    }
}
