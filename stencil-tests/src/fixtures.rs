use rust_decimal::Decimal;
use stencil::Entity;
use time::PrimitiveDateTime;
use uuid::Uuid;

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[stencil(name = "people")]
pub struct Person {
    #[stencil(key = "identity")]
    pub id: i64,
    #[stencil(name = "full_name")]
    pub name: String,
    pub age: i32,
    #[stencil(ignored)]
    pub nickname: Option<String>,
}

impl Person {
    pub fn new(name: &str, age: i32) -> Self {
        Self {
            name: name.into(),
            age,
            ..Default::default()
        }
    }
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[stencil(name = "tokens")]
pub struct Token {
    #[stencil(key = "guid")]
    pub id: Uuid,
    pub label: String,
}

/// Assigned numeric key, generated when absent.
#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[stencil(schema = "sales")]
pub struct Order {
    #[stencil(key)]
    pub id: Option<i64>,
    pub amount: Decimal,
    #[stencil(read_only)]
    pub created: Option<PrimitiveDateTime>,
}

/// Assigned text key.
#[derive(Entity, Default, Debug, Clone, PartialEq)]
pub struct Ticket {
    #[stencil(key = "assigned")]
    pub code: String,
    pub title: String,
}

/// Key produced by a database trigger.
#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[stencil(name = "sensor_readings")]
pub struct SensorReading {
    #[stencil(key = "trigger_identity")]
    pub id: i64,
    pub reading: f64,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[stencil(name = "memberships")]
pub struct Membership {
    #[stencil(key)]
    pub user_id: i64,
    #[stencil(key)]
    pub group_id: i64,
    pub role: String,
}

/// Link table made only of keys.
#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[stencil(name = "post_tags")]
pub struct PostTag {
    #[stencil(key)]
    pub post_id: i64,
    #[stencil(key)]
    pub tag: String,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[stencil(name = "departments")]
pub struct Department {
    #[stencil(key = "identity")]
    pub id: i64,
    pub title: String,
}

#[derive(Entity, Default, Debug, Clone, PartialEq)]
#[stencil(name = "employees")]
pub struct Employee {
    #[stencil(key = "identity")]
    pub id: i64,
    pub name: String,
    pub department_id: i64,
}

/// Declared without key attributes, the key comes from the `id` naming convention.
#[derive(Entity, Debug, Clone, PartialEq)]
pub struct Note {
    pub id: i32,
    pub body: String,
}
