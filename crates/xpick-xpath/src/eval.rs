//! XPath evaluation over the arena DOM
//!
//! Node-sets are kept in document order without duplicates after every step.
//! Reverse axes (ancestor, preceding-sibling, parent) number their predicate
//! positions nearest-first, as XPath 1.0 requires.

use xpick_dom::{Document, DomTree, NodeData, NodeId};

use crate::ast::{ArithOp, Axis, CompareOp, Expr, Function, NodeTest, Step};
use crate::XPathError;

/// A node in the XPath data model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Item {
    Node(NodeId),
    /// Attribute `index` of the owner element
    Attr(NodeId, usize),
}

/// Result of evaluating an expression
#[derive(Debug, Clone)]
pub(crate) enum Value {
    Nodes(Vec<Item>),
    Str(String),
    Num(f64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy)]
struct Context {
    item: Item,
    position: usize,
    size: usize,
}

pub(crate) struct Evaluator<'a> {
    tree: &'a DomTree,
    order: Vec<u32>,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(doc: &'a Document) -> Self {
        let tree = doc.tree();
        Self {
            tree,
            order: tree.document_order(),
        }
    }

    /// Evaluate `expr` with `context` as the context node; must yield a node-set
    pub(crate) fn select(&self, expr: &Expr, context: NodeId) -> Result<Vec<Item>, XPathError> {
        let ctx = Context {
            item: Item::Node(context),
            position: 1,
            size: 1,
        };
        match self.eval(expr, &ctx)? {
            Value::Nodes(items) => Ok(items),
            _ => Err(XPathError::NotANodeSet),
        }
    }

    fn eval(&self, expr: &Expr, ctx: &Context) -> Result<Value, XPathError> {
        match expr {
            Expr::Or(a, b) => Ok(Value::Bool(self.eval_bool(a, ctx)? || self.eval_bool(b, ctx)?)),
            Expr::And(a, b) => Ok(Value::Bool(self.eval_bool(a, ctx)? && self.eval_bool(b, ctx)?)),
            Expr::Compare(op, a, b) => {
                let left = self.eval(a, ctx)?;
                let right = self.eval(b, ctx)?;
                Ok(Value::Bool(self.compare(*op, &left, &right)))
            }
            Expr::Arith(op, a, b) => {
                let left = self.to_number(&self.eval(a, ctx)?);
                let right = self.to_number(&self.eval(b, ctx)?);
                Ok(Value::Num(match op {
                    ArithOp::Add => left + right,
                    ArithOp::Sub => left - right,
                }))
            }
            Expr::Negate(inner) => Ok(Value::Num(-self.to_number(&self.eval(inner, ctx)?))),
            Expr::Union(a, b) => {
                let (Value::Nodes(mut left), Value::Nodes(right)) = (self.eval(a, ctx)?, self.eval(b, ctx)?) else {
                    return Err(XPathError::NotANodeSet);
                };
                left.extend(right);
                self.sort_dedup(&mut left);
                Ok(Value::Nodes(left))
            }
            Expr::Literal(s) => Ok(Value::Str(s.clone())),
            Expr::Number(n) => Ok(Value::Num(*n)),
            Expr::Call(function, args) => self.call(*function, args, ctx),
            Expr::Path(path) => {
                let start = if path.absolute {
                    Item::Node(NodeId::ROOT)
                } else {
                    ctx.item
                };
                self.apply_steps(vec![start], &path.steps).map(Value::Nodes)
            }
            Expr::Filter { primary, predicates, steps } => {
                let Value::Nodes(mut items) = self.eval(primary, ctx)? else {
                    return Err(XPathError::NotANodeSet);
                };
                for predicate in predicates {
                    items = self.filter(items, predicate)?;
                }
                self.apply_steps(items, steps).map(Value::Nodes)
            }
        }
    }

    fn eval_bool(&self, expr: &Expr, ctx: &Context) -> Result<bool, XPathError> {
        Ok(self.to_bool(&self.eval(expr, ctx)?))
    }

    fn eval_string(&self, expr: &Expr, ctx: &Context) -> Result<String, XPathError> {
        Ok(self.to_string(&self.eval(expr, ctx)?))
    }

    fn apply_steps(&self, mut items: Vec<Item>, steps: &[Step]) -> Result<Vec<Item>, XPathError> {
        for step in steps {
            items = self.apply_step(&items, step)?;
        }
        Ok(items)
    }

    fn apply_step(&self, input: &[Item], step: &Step) -> Result<Vec<Item>, XPathError> {
        let mut out = Vec::new();
        for &item in input {
            let mut candidates: Vec<Item> = self
                .axis(item, step.axis)
                .into_iter()
                .filter(|&candidate| self.node_test(candidate, step.axis, &step.test))
                .collect();
            for predicate in &step.predicates {
                candidates = self.filter(candidates, predicate)?;
            }
            out.extend(candidates);
        }
        self.sort_dedup(&mut out);
        Ok(out)
    }

    /// Keep items for which the predicate holds; numbers compare against position
    fn filter(&self, items: Vec<Item>, predicate: &Expr) -> Result<Vec<Item>, XPathError> {
        let size = items.len();
        let mut kept = Vec::with_capacity(size);
        for (index, item) in items.into_iter().enumerate() {
            let ctx = Context {
                item,
                position: index + 1,
                size,
            };
            let keep = match self.eval(predicate, &ctx)? {
                Value::Num(n) => (index + 1) as f64 == n,
                other => self.to_bool(&other),
            };
            if keep {
                kept.push(item);
            }
        }
        Ok(kept)
    }

    fn axis(&self, item: Item, axis: Axis) -> Vec<Item> {
        let tree = self.tree;
        match (axis, item) {
            (Axis::SelfAxis, _) => vec![item],
            (Axis::Attribute, Item::Node(id)) => tree
                .element(id)
                .map(|e| (0..e.attrs.len()).map(|i| Item::Attr(id, i)).collect())
                .unwrap_or_default(),
            (Axis::Parent, Item::Node(id)) => tree.parent(id).map(Item::Node).into_iter().collect(),
            (Axis::Parent, Item::Attr(owner, _)) => vec![Item::Node(owner)],
            (Axis::Ancestor | Axis::AncestorOrSelf, _) => {
                let mut out = Vec::new();
                if axis == Axis::AncestorOrSelf {
                    out.push(item);
                }
                let start = match item {
                    Item::Node(id) => tree.parent(id),
                    Item::Attr(owner, _) => Some(owner),
                };
                if let Some(start) = start {
                    out.push(Item::Node(start));
                    out.extend(tree.ancestors(start).map(Item::Node));
                }
                out
            }
            (Axis::Child, Item::Node(id)) => tree.children(id).map(|(child, _)| Item::Node(child)).collect(),
            (Axis::Descendant, Item::Node(id)) => tree.descendants(id).map(Item::Node).collect(),
            (Axis::DescendantOrSelf, Item::Node(id)) => std::iter::once(id)
                .chain(tree.descendants(id))
                .map(Item::Node)
                .collect(),
            (Axis::DescendantOrSelf, Item::Attr(..)) => vec![item],
            (Axis::FollowingSibling, Item::Node(id)) => {
                self.walk_siblings(id, |n| n.next_sibling)
            }
            (Axis::PrecedingSibling, Item::Node(id)) => {
                self.walk_siblings(id, |n| n.prev_sibling)
            }
            (
                Axis::Attribute
                | Axis::Child
                | Axis::Descendant
                | Axis::FollowingSibling
                | Axis::PrecedingSibling,
                Item::Attr(..),
            ) => Vec::new(),
        }
    }

    fn walk_siblings(&self, id: NodeId, link: impl Fn(&xpick_dom::Node) -> NodeId) -> Vec<Item> {
        let mut out = Vec::new();
        let mut current = self.tree.get(id).map(&link);
        while let Some(next) = current.filter(|n| n.is_valid()) {
            out.push(Item::Node(next));
            current = self.tree.get(next).map(&link);
        }
        out
    }

    fn node_test(&self, item: Item, axis: Axis, test: &NodeTest) -> bool {
        match item {
            Item::Attr(owner, index) => match test {
                NodeTest::Node => true,
                NodeTest::Any => axis == Axis::Attribute,
                NodeTest::Name(name) => {
                    axis == Axis::Attribute
                        && self
                            .tree
                            .element(owner)
                            .and_then(|e| e.attrs.get(index))
                            .is_some_and(|a| a.name.eq_ignore_ascii_case(name))
                }
                NodeTest::Text | NodeTest::Comment => false,
            },
            Item::Node(id) => {
                let Some(node) = self.tree.get(id) else {
                    return false;
                };
                match (test, &node.data) {
                    (NodeTest::Node, _) => true,
                    (NodeTest::Text, NodeData::Text(_)) => true,
                    (NodeTest::Comment, NodeData::Comment(_)) => true,
                    (NodeTest::Any, NodeData::Element(_)) => true,
                    (NodeTest::Name(name), NodeData::Element(e)) => e.name.eq_ignore_ascii_case(name),
                    _ => false,
                }
            }
        }
    }

    fn order_key(&self, item: Item) -> (u32, usize) {
        let rank = |id: NodeId| self.order.get(id.index()).copied().unwrap_or(u32::MAX);
        match item {
            Item::Node(id) => (rank(id), 0),
            Item::Attr(owner, index) => (rank(owner), index + 1),
        }
    }

    fn sort_dedup(&self, items: &mut Vec<Item>) {
        items.sort_by_key(|&item| self.order_key(item));
        items.dedup();
    }

    fn string_value(&self, item: Item) -> String {
        match item {
            Item::Attr(owner, index) => self
                .tree
                .element(owner)
                .and_then(|e| e.attrs.get(index))
                .map(|a| a.value.clone())
                .unwrap_or_default(),
            Item::Node(id) => match self.tree.get(id).map(|n| &n.data) {
                Some(NodeData::Text(t) | NodeData::Comment(t)) => t.clone(),
                Some(NodeData::Element(_) | NodeData::Document) => self.tree.text_content(id),
                Some(NodeData::Doctype { .. }) | None => String::new(),
            },
        }
    }

    fn item_name(&self, item: Item) -> String {
        match item {
            Item::Attr(owner, index) => self
                .tree
                .element(owner)
                .and_then(|e| e.attrs.get(index))
                .map(|a| a.name.clone())
                .unwrap_or_default(),
            Item::Node(id) => self.tree.tag_name(id).unwrap_or("").to_string(),
        }
    }

    fn to_string(&self, value: &Value) -> String {
        match value {
            Value::Nodes(items) => items.first().map(|&i| self.string_value(i)).unwrap_or_default(),
            Value::Str(s) => s.clone(),
            Value::Num(n) => format_number(*n),
            Value::Bool(b) => b.to_string(),
        }
    }

    fn to_number(&self, value: &Value) -> f64 {
        match value {
            Value::Num(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Str(s) => parse_number(s),
            Value::Nodes(_) => parse_number(&self.to_string(value)),
        }
    }

    fn to_bool(&self, value: &Value) -> bool {
        match value {
            Value::Nodes(items) => !items.is_empty(),
            Value::Str(s) => !s.is_empty(),
            Value::Num(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
        }
    }

    fn compare(&self, op: CompareOp, left: &Value, right: &Value) -> bool {
        match (left, right) {
            (Value::Nodes(a), Value::Nodes(b)) => {
                let rights: Vec<Value> = b.iter().map(|&y| Value::Str(self.string_value(y))).collect();
                a.iter().any(|&x| {
                    let sx = Value::Str(self.string_value(x));
                    rights.iter().any(|sy| self.compare_atoms(op, &sx, sy))
                })
            }
            (Value::Nodes(a), Value::Bool(_)) => self.compare_atoms(op, &Value::Bool(!a.is_empty()), right),
            (Value::Bool(_), Value::Nodes(b)) => self.compare_atoms(op, left, &Value::Bool(!b.is_empty())),
            (Value::Nodes(a), _) => a
                .iter()
                .any(|&x| self.compare_atoms(op, &Value::Str(self.string_value(x)), right)),
            (_, Value::Nodes(b)) => b
                .iter()
                .any(|&y| self.compare_atoms(op, left, &Value::Str(self.string_value(y)))),
            _ => self.compare_atoms(op, left, right),
        }
    }

    fn compare_atoms(&self, op: CompareOp, left: &Value, right: &Value) -> bool {
        match op {
            CompareOp::Eq | CompareOp::NotEq => {
                let equal = if matches!(left, Value::Bool(_)) || matches!(right, Value::Bool(_)) {
                    self.to_bool(left) == self.to_bool(right)
                } else if matches!(left, Value::Num(_)) || matches!(right, Value::Num(_)) {
                    self.to_number(left) == self.to_number(right)
                } else {
                    self.to_string(left) == self.to_string(right)
                };
                equal == (op == CompareOp::Eq)
            }
            CompareOp::Lt => self.to_number(left) < self.to_number(right),
            CompareOp::LtEq => self.to_number(left) <= self.to_number(right),
            CompareOp::Gt => self.to_number(left) > self.to_number(right),
            CompareOp::GtEq => self.to_number(left) >= self.to_number(right),
        }
    }

    fn call(&self, function: Function, args: &[Expr], ctx: &Context) -> Result<Value, XPathError> {
        let arg = |index: usize| {
            args.get(index).ok_or_else(|| XPathError::MissingArgument {
                function: format!("{:?}", function),
                index,
            })
        };
        // Optional string argument defaulting to the context node
        let string_or_context = |index: usize| match args.get(index) {
            Some(expr) => self.eval_string(expr, ctx),
            None => Ok(self.string_value(ctx.item)),
        };

        let value = match function {
            Function::Position => Value::Num(ctx.position as f64),
            Function::Last => Value::Num(ctx.size as f64),
            Function::Count => match self.eval(arg(0)?, ctx)? {
                Value::Nodes(items) => Value::Num(items.len() as f64),
                _ => return Err(XPathError::NotANodeSet),
            },
            Function::String => Value::Str(string_or_context(0)?),
            Function::Concat => {
                let mut out = String::new();
                for expr in args {
                    out.push_str(&self.eval_string(expr, ctx)?);
                }
                Value::Str(out)
            }
            Function::StartsWith => {
                let haystack = self.eval_string(arg(0)?, ctx)?;
                Value::Bool(haystack.starts_with(&self.eval_string(arg(1)?, ctx)?))
            }
            Function::Contains => {
                let haystack = self.eval_string(arg(0)?, ctx)?;
                Value::Bool(haystack.contains(&self.eval_string(arg(1)?, ctx)?))
            }
            Function::NormalizeSpace => Value::Str(normalize_space(&string_or_context(0)?)),
            Function::StringLength => Value::Num(string_or_context(0)?.chars().count() as f64),
            Function::Translate => {
                let source = self.eval_string(arg(0)?, ctx)?;
                let from: Vec<char> = self.eval_string(arg(1)?, ctx)?.chars().collect();
                let to: Vec<char> = self.eval_string(arg(2)?, ctx)?.chars().collect();
                Value::Str(
                    source
                        .chars()
                        .filter_map(|c| match from.iter().position(|&f| f == c) {
                            Some(i) => to.get(i).copied(),
                            None => Some(c),
                        })
                        .collect(),
                )
            }
            Function::Not => Value::Bool(!self.eval_bool(arg(0)?, ctx)?),
            Function::True => Value::Bool(true),
            Function::False => Value::Bool(false),
            Function::Boolean => Value::Bool(self.eval_bool(arg(0)?, ctx)?),
            Function::Number => match args.first() {
                Some(expr) => Value::Num(self.to_number(&self.eval(expr, ctx)?)),
                None => Value::Num(parse_number(&self.string_value(ctx.item))),
            },
            Function::Name | Function::LocalName => {
                let item = match args.first() {
                    Some(expr) => match self.eval(expr, ctx)? {
                        Value::Nodes(items) => items.first().copied(),
                        _ => return Err(XPathError::NotANodeSet),
                    },
                    None => Some(ctx.item),
                };
                Value::Str(item.map(|i| self.item_name(i)).unwrap_or_default())
            }
        };
        Ok(value)
    }
}

/// Collapse runs of whitespace and trim
pub fn normalize_space(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// XPath `number()` conversion: optional sign, digits, optional fraction
fn parse_number(s: &str) -> f64 {
    let t = s.trim();
    let digits = t.strip_prefix('-').unwrap_or(t);
    let valid = !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.chars().filter(|&c| c == '.').count() <= 1
        && digits != ".";
    if valid { t.parse().unwrap_or(f64::NAN) } else { f64::NAN }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let s = if n > 0.0 { "Infinity" } else { "-Infinity" };
        s.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), 42.0);
        assert_eq!(parse_number("-1.5"), -1.5);
        assert!(parse_number("1e5").is_nan());
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("").is_nan());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_normalize_space() {
        assert_eq!(normalize_space("  a \n\t b  "), "a b");
        assert_eq!(normalize_space("   "), "");
    }
}
