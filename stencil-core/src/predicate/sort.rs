use std::borrow::Cow;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

/// One ORDER BY term, by property name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: Cow<'static, str>,
    pub order: Order,
}

impl Sort {
    pub fn asc(property: impl Into<Cow<'static, str>>) -> Self {
        Self {
            property: property.into(),
            order: Order::Asc,
        }
    }
    pub fn desc(property: impl Into<Cow<'static, str>>) -> Self {
        Self {
            property: property.into(),
            order: Order::Desc,
        }
    }
}
