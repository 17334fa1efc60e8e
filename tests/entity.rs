#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};
    use stencil::{Entity, KeyKind, RowLabeled, StencilError, Value};
    use time::{PrimitiveDateTime, macros::datetime};
    use uuid::Uuid;

    #[derive(Entity, Default, Debug, PartialEq)]
    struct InventoryItem {
        #[stencil(key = "guid")]
        id: Uuid,
        #[stencil(name = "sku_code")]
        r#type: String,
        _quantity: Option<u32>,
        tags: Vec<String>,
        #[stencil(read_only)]
        updated: Option<PrimitiveDateTime>,
        #[stencil(ignored)]
        cache: HashMap<String, i32>,
    }

    #[derive(Entity, Debug)]
    #[stencil(name = "audit_log", schema = "ops")]
    struct AuditEntry {
        #[stencil(key = "trigger_identity")]
        id: i64,
        message: String,
    }

    fn labeled(labels: &[&str], values: Vec<Value>) -> RowLabeled {
        RowLabeled::new(
            labels.iter().map(|v| v.to_string()).collect::<Arc<[String]>>(),
            values.into_boxed_slice(),
        )
    }

    #[test]
    fn describe() {
        let schema = InventoryItem::describe();
        assert_eq!(schema.table.name, "inventory_item");
        assert_eq!(schema.table.schema, "");
        assert_eq!(schema.entity_name(), "inventory_item");
        let names = schema
            .properties
            .iter()
            .map(|p| &*p.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["id", "type", "quantity", "tags", "updated", "cache"]);
        let columns = schema
            .mapped()
            .map(|p| &*p.column_name)
            .collect::<Vec<_>>();
        assert_eq!(columns, ["id", "sku_code", "quantity", "tags", "updated"]);

        let id = schema.find_property("ID").expect("The key is described");
        assert_eq!(id.key_kind, KeyKind::Guid);
        assert!(matches!(id.value, Value::Uuid(None)));
        assert!(schema.generated_key().is_none());
        let sku = schema.require_property("Type").expect("Lookup ignores case");
        assert!(sku.is_aliased());
        assert!(matches!(sku.value, Value::Varchar(None)));
        assert!(matches!(
            schema.require_property("quantity").map(|p| &p.value),
            Ok(Value::UInt32(None))
        ));
        assert!(matches!(
            schema.require_property("tags").map(|p| &p.value),
            Ok(Value::List(None, inner)) if matches!(**inner, Value::Varchar(None))
        ));
        assert!(
            schema
                .require_property("updated")
                .expect("Read only properties are mapped")
                .read_only
        );
        let cache = schema
            .find_property("cache")
            .expect("Ignored properties are still described");
        assert!(cache.ignored);
        assert!(schema.require_property("cache").is_err());
        schema.validate().expect("A single guid key is valid");

        let schema = AuditEntry::describe();
        assert_eq!(schema.entity_name(), "ops.audit_log");
        assert_eq!(
            schema.generated_key().map(|p| p.key_kind),
            Some(KeyKind::TriggerIdentity)
        );
    }

    #[test]
    fn values() {
        let id = Uuid::parse_str("7b4e2c1a-0d3f-4a8e-9b6c-5f2a1e3d4c70").unwrap();
        let item = InventoryItem {
            id,
            r#type: "BX-12".into(),
            _quantity: Some(40),
            tags: vec!["fragile".into()],
            updated: Some(datetime!(2025-03-14 09:30)),
            cache: HashMap::from([("hits".into(), 3)]),
        };
        let values = item.values();
        let names = values.iter().map(|(name, _)| *name).collect::<Vec<_>>();
        assert_eq!(names, ["id", "type", "quantity", "tags", "updated"]);
        assert_eq!(values[0].1, Value::Uuid(Some(id)));
        assert_eq!(values[1].1, Value::Varchar(Some("BX-12".into())));
        assert_eq!(values[2].1, Value::UInt32(Some(40)));
        assert!(matches!(&values[3].1, Value::List(Some(v), ..) if v.len() == 1));
        assert_eq!(item.value_of("QUANTITY"), Some(Value::UInt32(Some(40))));
        assert_eq!(item.value_of("cache"), None);
    }

    #[test]
    fn set_value() {
        let mut item = InventoryItem::default();
        item.set_value("TYPE", Value::Varchar(Some("CR-7".into())))
            .expect("Properties are matched ignoring case");
        assert_eq!(item.r#type, "CR-7");
        item.set_value("quantity", Value::Int64(Some(12)))
            .expect("Integer widths are converted");
        assert_eq!(item._quantity, Some(12));
        item.set_value("quantity", Value::Null)
            .expect("Null clears an optional property");
        assert_eq!(item._quantity, None);

        assert!(
            item.set_value("quantity", Value::Varchar(Some("many".into())))
                .is_err()
        );
        let error = item
            .set_value("cache", Value::Null)
            .expect_err("Ignored properties cannot be assigned");
        assert!(matches!(
            error.downcast_ref::<StencilError>(),
            Some(StencilError::UnmappedProperty { entity, property })
                if entity == "inventory_item" && property == "cache"
        ));
    }

    #[test]
    fn from_row_with_default() {
        let id = Uuid::parse_str("0e9d6b2f-41c8-4f57-a3b0-8d1c2e6f7a95").unwrap();
        let item = InventoryItem::from_row(labeled(
            &["ID", "sku_code", "Quantity", "unknown"],
            vec![
                Value::Uuid(Some(id)),
                Value::Varchar(Some("PL-3".into())),
                Value::Int32(Some(8)),
                Value::Boolean(Some(true)),
            ],
        ))
        .expect("Missing columns fall back to the default");
        assert_eq!(
            item,
            InventoryItem {
                id,
                r#type: "PL-3".into(),
                _quantity: Some(8),
                ..Default::default()
            }
        );

        let item = InventoryItem::from_row(labeled(
            &["type"],
            vec![Value::Varchar(Some("by property".into()))],
        ))
        .expect("Columns can be labeled with the property name");
        assert_eq!(item.r#type, "by property");
    }

    #[test]
    fn from_row_without_default() {
        let entry = AuditEntry::from_row(labeled(
            &["id", "message"],
            vec![Value::Int64(Some(3)), Value::Varchar(Some("login".into()))],
        ))
        .expect("Every column is present");
        assert_eq!(entry.id, 3);
        assert_eq!(entry.message, "login");

        let error = AuditEntry::from_row(labeled(&["id"], vec![Value::Int64(Some(3))]))
            .expect_err("A type without default needs every column");
        assert!(error.to_string().contains("`message`"));
    }
}
