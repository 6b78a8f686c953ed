// SPDX-License-Identifier: Unlicense
use crate::ast::{self, Handle, Node, NodeKind, NodeVariant};

/// Owns every node built while parsing. Entries are only ever appended, so
/// an [`ast::Id`] handed out once keeps denoting the same node until the
/// arena itself is dropped.
#[derive(Debug)]
pub struct AstArena {
    nodes: id_arena::Arena<Node>,
}

impl AstArena {
    pub fn new() -> Self {
        Self {
            nodes: id_arena::Arena::new(),
        }
    }

    pub fn create<T: NodeVariant>(&mut self, value: T) -> Handle<T> {
        let id = self.nodes.alloc(Node {
            kind: value.into_kind(),
        });
        Handle::new(id)
    }

    pub fn get<T: NodeVariant>(&self, handle: Handle<T>) -> Option<&T> {
        self.nodes
            .get(handle.id())
            .and_then(|node| T::from_kind(&node.kind))
    }

    pub fn node(&self, id: ast::Id) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 0
    }

    /// Nodes in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (ast::Id, &Node)> {
        self.nodes.iter()
    }

    pub fn children(&self, id: ast::Id) -> Vec<ast::Id> {
        self.node(id).map(|n| n.kind.children()).unwrap_or_default()
    }

    /// Identifier and literal leaves under `root`, left to right.
    pub fn leaves(&self, root: ast::Id) -> Vec<ast::Id> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if node.kind.is_leaf() {
                out.push(id);
            } else {
                stack.extend(node.kind.children().into_iter().rev());
            }
        }
        out
    }

    /// S-expression rendering of the subtree under `id`. Walks with an
    /// explicit stack, so tree depth is bounded only by memory.
    pub fn render(&self, id: ast::Id) -> String {
        let mut buf = String::new();
        let mut work = vec![Render::Visit(id)];
        while let Some(step) = work.pop() {
            match step {
                Render::Open(head) => {
                    buf.push('(');
                    buf.push_str(head);
                }
                Render::Space => buf.push(' '),
                Render::Close => buf.push(')'),
                Render::Visit(id) => self.render_node(id, &mut buf, &mut work),
            }
        }
        buf
    }

    fn render_node(&self, id: ast::Id, buf: &mut String, work: &mut Vec<Render>) {
        let Some(node) = self.node(id) else {
            buf.push_str("<dangling>");
            return;
        };
        let head = match &node.kind {
            NodeKind::Identifier(i) => return buf.push_str(&i.name),
            NodeKind::FixedPointLiteral(f) => return buf.push_str(&format!("{:?}", f.value)),
            NodeKind::IntegerLiteral(i) => return buf.push_str(&i.value.to_string()),
            NodeKind::Paren(_) => "paren",
            NodeKind::UnaryOp(u) => match u.op {
                ast::UnOpKind::Neg => "neg",
            },
            NodeKind::BinaryOp(b) => b.op.symbol(),
            NodeKind::Assignment(_) => "=",
            NodeKind::Sequence(_) => "seq",
        };
        work.push(Render::Close);
        for child in node.kind.children().into_iter().rev() {
            work.push(Render::Visit(child));
            work.push(Render::Space);
        }
        work.push(Render::Open(head));
    }
}

enum Render {
    Visit(ast::Id),
    Open(&'static str),
    Space,
    Close,
}

impl Default for AstArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BiOpKind, BinaryOp, Identifier, IntegerLiteral};
    use proptest::prelude::*;

    #[test]
    fn arena_should_return_typed_values() {
        let mut arena = AstArena::new();
        let x = arena.create(Identifier { name: "x".into() });
        let one = arena.create(IntegerLiteral { value: 1 });
        let sum = arena.create(BinaryOp {
            op: BiOpKind::Add,
            lhs: x.id(),
            rhs: one.id(),
        });

        assert_eq!(arena.len(), 3);
        assert_eq!(arena.get(x).map(|i| i.name.as_str()), Some("x"));
        assert_eq!(arena.get(one).map(|i| i.value), Some(1));
        assert_eq!(arena.render(sum.id()), "(+ x 1)");
        assert_eq!(arena.leaves(sum.id()), vec![x.id(), one.id()]);
    }

    #[test]
    fn arena_should_iterate_in_creation_order() {
        let mut arena = AstArena::new();
        assert!(arena.is_empty());
        let ids: Vec<_> = (0..4)
            .map(|v| arena.create(IntegerLiteral { value: v }).id())
            .collect();
        let seen: Vec<_> = arena.iter().map(|(id, _)| id).collect();
        assert_eq!(seen, ids);
    }

    #[test]
    fn arena_should_render_very_long_chains() {
        let mut arena = AstArena::new();
        let mut acc = arena.create(IntegerLiteral { value: 0 }).id();
        for value in 1..100_000 {
            let rhs = arena.create(IntegerLiteral { value }).id();
            acc = arena
                .create(BinaryOp {
                    op: BiOpKind::Add,
                    lhs: acc,
                    rhs,
                })
                .id();
        }

        let rendered = arena.render(acc);
        assert!(rendered.starts_with(&"(+ ".repeat(99_999)));
        assert!(rendered.ends_with(" 99998) 99999)"));
        assert_eq!(rendered.matches('(').count(), 99_999);
        assert_eq!(arena.leaves(acc).len(), 100_000);
    }

    proptest! {
        #[test]
        fn handles_should_stay_stable(values in proptest::collection::vec(any::<i64>(), 0..64)) {
            let mut arena = AstArena::new();
            let handles: Vec<_> = values
                .iter()
                .map(|v| arena.create(IntegerLiteral { value: *v }))
                .collect();

            for (i, a) in handles.iter().enumerate() {
                for b in &handles[i + 1..] {
                    prop_assert_ne!(a.id(), b.id());
                }
            }
            for (handle, value) in handles.iter().zip(&values) {
                prop_assert_eq!(arena.get(*handle).map(|n| n.value), Some(*value));
            }
        }
    }
}
