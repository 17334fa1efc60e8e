use crate::{
    BoolOp, Entity, EntitySchema, KeyValue, Operator, ParameterBag, Result, StencilError, Value,
    writer::{Context, SqlWriter},
};
use std::borrow::Cow;

/// Condition on a single property.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub property: Cow<'static, str>,
    pub operator: Operator,
    pub value: Value,
    pub negate: bool,
}

/// Conditions combined with the same connective.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateGroup {
    pub operator: BoolOp,
    pub predicates: Vec<Predicate>,
}

/// Recursive filter lowered into a WHERE clause by [`SqlWriter::write_predicate`].
///
/// ```rust
/// use stencil_core::{GenericSqlWriter, EntitySchema, ParameterBag, Predicate, PropertyDescriptor};
/// let schema = EntitySchema::new("people").property(PropertyDescriptor::new("Age"));
/// let mut params = ParameterBag::new();
/// let sql = Predicate::and([Predicate::gt("Age", 20), Predicate::lt("Age", 30)])
///     .compile(&GenericSqlWriter::new(), &schema, &mut params)
///     .unwrap();
/// assert_eq!(sql, r#"("Age" > @Age_1 AND "Age" < @Age_2)"#);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Field(FieldPredicate),
    Group(PredicateGroup),
}

impl Predicate {
    pub fn field(
        property: impl Into<Cow<'static, str>>,
        operator: Operator,
        value: impl Into<Value>,
    ) -> Self {
        Predicate::Field(FieldPredicate {
            property: property.into(),
            operator,
            value: value.into(),
            negate: false,
        })
    }
    pub fn eq(property: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self::field(property, Operator::Eq, value)
    }
    pub fn ne(property: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self::field(property, Operator::Ne, value)
    }
    pub fn gt(property: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self::field(property, Operator::Gt, value)
    }
    pub fn ge(property: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self::field(property, Operator::Ge, value)
    }
    pub fn lt(property: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self::field(property, Operator::Lt, value)
    }
    pub fn le(property: impl Into<Cow<'static, str>>, value: impl Into<Value>) -> Self {
        Self::field(property, Operator::Le, value)
    }
    pub fn like(property: impl Into<Cow<'static, str>>, pattern: impl Into<Value>) -> Self {
        Self::field(property, Operator::Like, pattern)
    }
    pub fn is_null(property: impl Into<Cow<'static, str>>) -> Self {
        Self::field(property, Operator::IsNull, Value::Null)
    }
    pub fn is_in<V: Into<Value>>(
        property: impl Into<Cow<'static, str>>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::field(
            property,
            Operator::In,
            Value::List(
                Some(values.into_iter().map(Into::into).collect()),
                Box::new(Value::Null),
            ),
        )
    }
    pub fn between(
        property: impl Into<Cow<'static, str>>,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Self {
        Self::field(
            property,
            Operator::Between,
            Value::List(Some(vec![low.into(), high.into()]), Box::new(Value::Null)),
        )
    }
    pub fn and(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Group(PredicateGroup {
            operator: BoolOp::And,
            predicates: predicates.into_iter().collect(),
        })
    }
    pub fn or(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Group(PredicateGroup {
            operator: BoolOp::Or,
            predicates: predicates.into_iter().collect(),
        })
    }

    /// Logical negation. Fields toggle their flag, groups are rewritten with De Morgan.
    pub fn not(self) -> Self {
        match self {
            Predicate::Field(mut field) => {
                field.negate = !field.negate;
                Predicate::Field(field)
            }
            Predicate::Group(group) => Predicate::Group(PredicateGroup {
                operator: group.operator.flip(),
                predicates: group.predicates.into_iter().map(Predicate::not).collect(),
            }),
        }
    }

    /// Equality on every mapped property of `entity`.
    pub fn matching<E: Entity>(entity: &E, schema: &EntitySchema) -> Self {
        let values = entity.values();
        Self::and(schema.mapped().filter_map(|p| {
            values
                .iter()
                .find(|(name, _)| p.name.eq_ignore_ascii_case(name))
                .map(|(_, value)| Self::eq(p.name.clone(), value.clone()))
        }))
    }

    /// Equality on the key properties of `entity`.
    pub fn by_key<E: Entity>(entity: &E, schema: &EntitySchema) -> Result<Self> {
        let values = entity.values();
        let predicates = schema
            .keys()
            .map(|p| {
                let value = values
                    .iter()
                    .find(|(name, _)| p.name.eq_ignore_ascii_case(name))
                    .map(|(_, v)| v.clone())
                    .unwrap_or_else(|| p.value.clone());
                Self::eq(p.name.clone(), value)
            })
            .collect::<Vec<_>>();
        if predicates.is_empty() {
            return Err(StencilError::key_misconfiguration(
                schema.entity_name(),
                "at least one key property must be defined",
            ));
        }
        Ok(Self::and(predicates))
    }

    /// Equality on the key properties from an identifier.
    ///
    /// A scalar identifier requires exactly one key property, a composite one must name
    /// every key property of the schema.
    pub fn by_id(id: &KeyValue, schema: &EntitySchema) -> Result<Self> {
        let keys = schema.keys().collect::<Vec<_>>();
        if keys.is_empty() {
            return Err(StencilError::key_misconfiguration(
                schema.entity_name(),
                "at least one key property must be defined",
            ));
        }
        match id {
            KeyValue::Scalar(value) => {
                let [key] = keys.as_slice() else {
                    return Err(StencilError::key_misconfiguration(
                        schema.entity_name(),
                        format!(
                            "a scalar identifier was provided but the entity has {} key properties",
                            keys.len()
                        ),
                    ));
                };
                Ok(Self::eq(key.name.clone(), value.clone()))
            }
            KeyValue::Composite(values) => keys
                .iter()
                .map(|key| {
                    values
                        .iter()
                        .find(|(name, _)| key.name.eq_ignore_ascii_case(name))
                        .map(|(_, value)| Self::eq(key.name.clone(), value.clone()))
                        .ok_or_else(|| {
                            StencilError::missing_input(format!(
                                "the identifier of `{}` does not contain the key property `{}`",
                                schema.entity_name(),
                                key.name
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::and),
        }
    }

    /// Lower into a WHERE fragment, binding the values into `params`.
    pub fn compile(
        &self,
        writer: &dyn SqlWriter,
        schema: &EntitySchema,
        params: &mut ParameterBag,
    ) -> Result<String> {
        let mut out = String::new();
        writer.write_predicate(&Context::default(), &mut out, params, schema, self)?;
        Ok(out)
    }
}
