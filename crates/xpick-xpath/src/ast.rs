//! XPath syntax tree

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Arith(ArithOp, Box<Expr>, Box<Expr>),
    Negate(Box<Expr>),
    Union(Box<Expr>, Box<Expr>),
    Literal(String),
    Number(f64),
    Call(Function, Vec<Expr>),
    Path(LocationPath),
    /// Primary expression with predicates, optionally followed by a relative path
    Filter {
        primary: Box<Expr>,
        predicates: Vec<Expr>,
        steps: Vec<Step>,
    },
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

/// Additive operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
}

/// Location path, absolute or relative
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

/// One location step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    /// The step `//` abbreviates
    pub(crate) fn descendant_or_self() -> Self {
        Self {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

/// Supported axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    SelfAxis,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Attribute,
}

impl Axis {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "child" => Some(Self::Child),
            "descendant" => Some(Self::Descendant),
            "descendant-or-self" => Some(Self::DescendantOrSelf),
            "self" => Some(Self::SelfAxis),
            "parent" => Some(Self::Parent),
            "ancestor" => Some(Self::Ancestor),
            "ancestor-or-self" => Some(Self::AncestorOrSelf),
            "following-sibling" => Some(Self::FollowingSibling),
            "preceding-sibling" => Some(Self::PrecedingSibling),
            "attribute" => Some(Self::Attribute),
            _ => None,
        }
    }
}

/// Node test of a step
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    /// `*`
    Any,
    /// Element (or attribute) name
    Name(String),
    /// `text()`
    Text,
    /// `node()`
    Node,
    /// `comment()`
    Comment,
}

impl NodeTest {
    pub(crate) fn node_type(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "node" => Some(Self::Node),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }
}

/// Core library functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Position,
    Last,
    Count,
    String,
    Concat,
    StartsWith,
    Contains,
    NormalizeSpace,
    StringLength,
    Translate,
    Not,
    True,
    False,
    Boolean,
    Number,
    Name,
    LocalName,
}

impl Function {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "position" => Some(Self::Position),
            "last" => Some(Self::Last),
            "count" => Some(Self::Count),
            "string" => Some(Self::String),
            "concat" => Some(Self::Concat),
            "starts-with" => Some(Self::StartsWith),
            "contains" => Some(Self::Contains),
            "normalize-space" => Some(Self::NormalizeSpace),
            "string-length" => Some(Self::StringLength),
            "translate" => Some(Self::Translate),
            "not" => Some(Self::Not),
            "true" => Some(Self::True),
            "false" => Some(Self::False),
            "boolean" => Some(Self::Boolean),
            "number" => Some(Self::Number),
            "name" => Some(Self::Name),
            "local-name" => Some(Self::LocalName),
            _ => None,
        }
    }

    /// Accepted argument count range (min, max); `None` means unbounded
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            Self::Position | Self::Last | Self::True | Self::False => (0, Some(0)),
            Self::Count | Self::Not | Self::Boolean => (1, Some(1)),
            Self::String
            | Self::NormalizeSpace
            | Self::StringLength
            | Self::Number
            | Self::Name
            | Self::LocalName => (0, Some(1)),
            Self::StartsWith | Self::Contains => (2, Some(2)),
            Self::Translate => (3, Some(3)),
            Self::Concat => (2, None),
        }
    }
}
