//! Combinational-logic statement trees and their translation to Verilog.
//!
//! Circuit-assembly code attaches logic to a module as [`LogicBlock`]s: small
//! typed trees of assignments over name references and binary operations,
//! built directly through constructors (or the operator overloads in
//! [`ops`]). There is no source-text inspection anywhere; the tree *is* the
//! logic.
//!
//! # Dispatch
//!
//! A block is only translated when its annotation tag is the literal
//! [`COMBINATIONAL`]; blocks with any other tag, or none, are invisible to
//! the translator. This tag is the sole mechanism deciding "is this logic, or
//! unrelated host code".
//!
//! # Translation rules
//!
//! - A binary operation renders as `( <lhs> <op> <rhs> )`. The parentheses
//!   are unconditional, whatever the operator's natural precedence, so the
//!   evaluation order of arbitrarily nested trees survives without a
//!   precedence-climbing emitter.
//! - An assignment renders as `assign <target> = <value>;`, the single
//!   statement form, and the only construct that produces output at
//!   statement granularity.
//! - A name reference renders as its identifier text. Targets are plain
//!   [`Symbol`]s rather than expressions, so a target identifier can never
//!   leak into the value text.
//! - Boolean and unary operations are representable in the tree but are
//!   **currently unsupported** by the translator: rendering one fails the
//!   whole generation run with [`TranslateError::Unsupported`], naming the
//!   construct and the enclosing block. They are never silently dropped.
//!
//! # Example
//!
//! ```
//! use vgen::expr::{LogicBlock, Stmt, ops::name, render_block};
//!
//! let mut block = LogicBlock::combinational("adder");
//! block.stmts.push(Stmt::assign("sum", name("a") + name("b")));
//!
//! let text = render_block(&block).unwrap();
//! assert_eq!(text, "  assign sum = ( a + b );\n");
//! ```

pub mod ops;

use std::{error::Error, fmt};

use crate::netlist::Symbol;

/// Annotation tag marking a block as translatable combinational logic.
pub const COMBINATIONAL: &str = "combinational";

/// Binary operators with a fixed Verilog token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Shl,
    Shr,
    BitOr,
    BitAnd,
    BitXor,
    FloorDiv,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl BinOp {
    pub fn token(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Shl => "<<",
            // arithmetic shift on the Verilog side
            BinOp::Shr => ">>>",
            BinOp::BitOr => "|",
            BinOp::BitAnd => "&",
            BinOp::BitXor => "^",
            BinOp::FloorDiv => "/",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
        }
    }
}

/// Unary operators. Tokens exist for diagnostics; translation of a unary
/// expression is currently unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Invert,
    Not,
    Plus,
    Minus,
}

impl UnaryOp {
    pub fn token(&self) -> &'static str {
        match self {
            UnaryOp::Invert => "~",
            UnaryOp::Not => "!",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

/// Short-circuit boolean operators. Tokens exist for diagnostics; translation
/// of a boolean expression is currently unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn token(&self) -> &'static str {
        match self {
            BoolOp::And => "&&",
            BoolOp::Or => "||",
        }
    }
}

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(Symbol),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Bool {
        op: BoolOp,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

/// A statement. Assignment is the only recognised form; it binds the target
/// name to the rendered value expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { target: Symbol, value: Expr },
}

impl Stmt {
    pub fn assign(target: &str, value: Expr) -> Stmt {
        Stmt::Assign {
            target: Symbol::from(target),
            value,
        }
    }
}

/// A named, optionally annotated group of statements attached to a module.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicBlock {
    pub name: Symbol,
    pub tag: Option<Symbol>,
    pub stmts: Vec<Stmt>,
}

impl LogicBlock {
    /// A block carrying the recognised combinational annotation.
    pub fn combinational(name: &str) -> LogicBlock {
        LogicBlock {
            name: Symbol::from(name),
            tag: Some(Symbol::from(COMBINATIONAL)),
            stmts: Vec::new(),
        }
    }

    /// A block with no annotation; the translator never sees it.
    pub fn untagged(name: &str) -> LogicBlock {
        LogicBlock {
            name: Symbol::from(name),
            tag: None,
            stmts: Vec::new(),
        }
    }

    pub fn is_combinational(&self) -> bool {
        self.tag.as_deref() == Some(COMBINATIONAL)
    }
}

/// Error response of the translator.
#[derive(Debug, PartialEq, Eq)]
pub enum TranslateError {
    /// The tree contains a construct the translator does not cover.
    Unsupported { construct: String, block: Symbol },
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::Unsupported { construct, block } => write!(
                f,
                "unsupported construct in block `{}`: {}",
                block, construct
            ),
        }
    }
}

impl Error for TranslateError {}

/// Render one block's statements as `assign` text, two-space indented, one
/// statement per line.
///
/// The caller is responsible for the annotation dispatch; this function
/// renders whatever block it is handed.
pub fn render_block(block: &LogicBlock) -> Result<String, TranslateError> {
    let mut out = String::new();
    for stmt in &block.stmts {
        let Stmt::Assign { target, value } = stmt;
        out.push_str("  assign ");
        out.push_str(target);
        out.push_str(" = ");
        render_expr(value, block, &mut out)?;
        out.push_str(";\n");
    }
    Ok(out)
}

fn render_expr(expr: &Expr, block: &LogicBlock, out: &mut String) -> Result<(), TranslateError> {
    match expr {
        Expr::Name(name) => out.push_str(name),
        Expr::Binary { op, lhs, rhs } => {
            out.push_str("( ");
            render_expr(lhs, block, out)?;
            out.push(' ');
            out.push_str(op.token());
            out.push(' ');
            render_expr(rhs, block, out)?;
            out.push_str(" )");
        }
        Expr::Unary { op, .. } => {
            return Err(TranslateError::Unsupported {
                construct: format!("unary operator `{}`", op.token()),
                block: block.name.clone(),
            });
        }
        Expr::Bool { op, .. } => {
            return Err(TranslateError::Unsupported {
                construct: format!("boolean operator `{}`", op.token()),
                block: block.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ops::name;
    use super::*;

    fn assign_block(value: Expr) -> LogicBlock {
        let mut block = LogicBlock::combinational("logic");
        block.stmts.push(Stmt::assign("q", value));
        block
    }

    #[test]
    fn operator_tokens() {
        let pairs = [
            (BinOp::Add, "+"),
            (BinOp::Sub, "-"),
            (BinOp::Mul, "*"),
            (BinOp::Div, "/"),
            (BinOp::Mod, "%"),
            (BinOp::Pow, "**"),
            (BinOp::Shl, "<<"),
            (BinOp::Shr, ">>>"),
            (BinOp::BitOr, "|"),
            (BinOp::BitAnd, "&"),
            (BinOp::BitXor, "^"),
            (BinOp::FloorDiv, "/"),
            (BinOp::Eq, "=="),
            (BinOp::Ne, "!="),
            (BinOp::Gt, ">"),
            (BinOp::Ge, ">="),
            (BinOp::Lt, "<"),
            (BinOp::Le, "<="),
        ];
        for (op, token) in pairs {
            assert_eq!(op.token(), token);
            let text = render_block(&assign_block(Expr::binary(op, name("a"), name("b")))).unwrap();
            assert_eq!(text, format!("  assign q = ( a {} b );\n", token));
        }
    }

    #[test]
    fn nested_expressions_keep_parentheses_balanced() {
        let expr = (name("a") + name("b")) * (name("c") - (name("d") << name("e")));
        let text = render_block(&assign_block(expr)).unwrap();

        assert_eq!(
            text,
            "  assign q = ( ( a + b ) * ( c - ( d << e ) ) );\n"
        );
        assert_eq!(
            text.matches('(').count(),
            text.matches(')').count()
        );
    }

    #[test]
    fn boolean_operation_is_rejected() {
        let block = assign_block(Expr::Bool {
            op: BoolOp::And,
            args: vec![name("a"), name("b")],
        });
        let err = render_block(&block).unwrap_err();
        assert_eq!(
            err,
            TranslateError::Unsupported {
                construct: "boolean operator `&&`".into(),
                block: Symbol::from("logic"),
            }
        );
    }

    #[test]
    fn unary_operation_is_rejected() {
        let block = assign_block(Expr::Unary {
            op: UnaryOp::Invert,
            arg: Box::new(name("a")),
        });
        let err = render_block(&block).unwrap_err();
        assert!(err.to_string().contains("unary operator `~`"));
        assert!(err.to_string().contains("`logic`"));
    }
}
