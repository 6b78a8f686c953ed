// SPDX-License-Identifier: Unlicense
use std::fmt;
use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedPointLiteral {
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub value: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOpKind {
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiOpKind {
    Add,
    Sub,
    Mul,
    Div,
}

impl BiOpKind {
    pub fn symbol(self) -> &'static str {
        match self {
            BiOpKind::Add => "+",
            BiOpKind::Sub => "-",
            BiOpKind::Mul => "*",
            BiOpKind::Div => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paren {
    pub inner: Id,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    pub op: UnOpKind,
    pub operand: Id,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub op: BiOpKind,
    pub lhs: Id,
    pub rhs: Id,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: Id,
    pub value: Id,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    pub items: Vec<Id>,
}

/// Every node shape the front end knows about. Composites refer to other
/// nodes by [`Id`]; the arena owns all of them.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Identifier(Identifier),
    FixedPointLiteral(FixedPointLiteral),
    IntegerLiteral(IntegerLiteral),
    Paren(Paren),
    UnaryOp(UnaryOp),
    BinaryOp(BinaryOp),
    Assignment(Assignment),
    Sequence(Sequence),
}

impl NodeKind {
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::Identifier(_) | NodeKind::FixedPointLiteral(_) | NodeKind::IntegerLiteral(_)
        )
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<Id> {
        match self {
            NodeKind::Identifier(_) | NodeKind::FixedPointLiteral(_) | NodeKind::IntegerLiteral(_) => {
                Vec::new()
            }
            NodeKind::Paren(p) => vec![p.inner],
            NodeKind::UnaryOp(u) => vec![u.operand],
            NodeKind::BinaryOp(b) => vec![b.lhs, b.rhs],
            NodeKind::Assignment(a) => vec![a.target, a.value],
            NodeKind::Sequence(s) => s.items.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
}

pub type Id = id_arena::Id<Node>;

/// A concrete node shape that can be stored in the arena and read back
/// through a typed [`Handle`].
pub trait NodeVariant: Sized {
    fn into_kind(self) -> NodeKind;
    fn from_kind(kind: &NodeKind) -> Option<&Self>;
}

macro_rules! node_variants {
    ($($variant:ident),* $(,)?) => {
        $(
            impl NodeVariant for $variant {
                fn into_kind(self) -> NodeKind {
                    NodeKind::$variant(self)
                }

                fn from_kind(kind: &NodeKind) -> Option<&Self> {
                    match kind {
                        NodeKind::$variant(node) => Some(node),
                        _ => None,
                    }
                }
            }
        )*
    };
}

node_variants!(
    Identifier,
    FixedPointLiteral,
    IntegerLiteral,
    Paren,
    UnaryOp,
    BinaryOp,
    Assignment,
    Sequence,
);

/// An [`Id`] whose variant is known statically.
pub struct Handle<T> {
    id: Id,
    marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(id: Id) -> Self {
        Self {
            id,
            marker: PhantomData,
        }
    }

    pub fn id(self) -> Id {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.id.index())
    }
}

impl<T> From<Handle<T>> for Id {
    fn from(handle: Handle<T>) -> Self {
        handle.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_should_project_only_its_own_kind() {
        let kind = Identifier { name: "x".into() }.into_kind();
        assert_eq!(
            Identifier::from_kind(&kind),
            Some(&Identifier { name: "x".into() })
        );
        assert!(IntegerLiteral::from_kind(&kind).is_none());
        assert!(kind.is_leaf());
    }
}
