use crate::Value;
use uuid::Uuid;

/// Random (v4) identifier for `Guid` keys.
pub fn new_guid() -> Uuid {
    Uuid::new_v4()
}

/// True when a `Guid` key still needs a value: null, nil or blank text.
pub fn is_unset_guid(value: &Value) -> bool {
    match value {
        Value::Uuid(Some(v)) => v.is_nil(),
        Value::Varchar(Some(v)) => {
            let v = v.trim();
            v.is_empty() || Uuid::parse_str(v).is_ok_and(|v| v.is_nil())
        }
        Value::Blob(Some(v)) => v.iter().all(|b| *b == 0),
        v => v.is_null(),
    }
}

/// True when an `Assigned` key still needs a value: null or blank text. Zero is a
/// value.
pub fn is_unset_assigned(value: &Value) -> bool {
    match value {
        Value::Varchar(Some(v)) => v.trim().is_empty(),
        v => v.is_null(),
    }
}
