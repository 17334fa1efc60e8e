/// Comparison applied by a field predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
    /// Membership in a list value.
    In,
    /// Inclusive range, the value is a two elements list.
    Between,
    IsNull,
}

impl Operator {
    /// Operator expressing the negation of this one, when the set contains it.
    pub fn inverse(&self) -> Option<Operator> {
        match self {
            Operator::Eq => Some(Operator::Ne),
            Operator::Ne => Some(Operator::Eq),
            Operator::Gt => Some(Operator::Le),
            Operator::Le => Some(Operator::Gt),
            Operator::Ge => Some(Operator::Lt),
            Operator::Lt => Some(Operator::Ge),
            Operator::Like | Operator::In | Operator::Between | Operator::IsNull => None,
        }
    }
}

/// Connective of a predicate group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

impl BoolOp {
    pub fn flip(&self) -> BoolOp {
        match self {
            BoolOp::And => BoolOp::Or,
            BoolOp::Or => BoolOp::And,
        }
    }
}
