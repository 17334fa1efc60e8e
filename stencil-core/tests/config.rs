#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Barrier},
        thread,
    };
    use stencil_core::{
        AsValue, Configuration, Entity, EntitySchema, ExplicitMapper, KeyKind, KeyValue,
        ManualClock, PropertyDescriptor, Result, RowLabeled, SchemaOverrides, SnowflakeGenerator,
        StencilError, Value, WorkerId,
    };
    use uuid::Uuid;

    #[derive(Default)]
    struct Article {
        id: i64,
        title: String,
    }

    impl Entity for Article {
        fn describe() -> EntitySchema {
            EntitySchema::new("articles")
                .property(PropertyDescriptor::new("Id").value(i64::as_empty_value()))
                .property(PropertyDescriptor::new("Title").value(String::as_empty_value()))
        }
        fn values(&self) -> Box<[(&'static str, Value)]> {
            Box::new([
                ("Id", self.id.as_value()),
                ("Title", self.title.clone().as_value()),
            ])
        }
        fn set_value(&mut self, property: &str, value: Value) -> Result<()> {
            match property {
                "Id" => self.id = AsValue::try_from_value(value)?,
                "Title" => self.title = AsValue::try_from_value(value)?,
                _ => return Err(StencilError::unmapped("articles", property)),
            }
            Ok(())
        }
        fn from_row(row: RowLabeled) -> Result<Self> {
            let mut result = Self::default();
            for (name, value) in row.labels.iter().zip(row.values) {
                result.set_value(name, value)?;
            }
            Ok(result)
        }
    }

    struct Token {
        id: Uuid,
    }

    impl Entity for Token {
        fn describe() -> EntitySchema {
            EntitySchema::new("tokens")
                .property(PropertyDescriptor::new("ID").value(Uuid::as_empty_value()))
        }
        fn values(&self) -> Box<[(&'static str, Value)]> {
            Box::new([("ID", self.id.as_value())])
        }
        fn set_value(&mut self, _property: &str, value: Value) -> Result<()> {
            self.id = AsValue::try_from_value(value)?;
            Ok(())
        }
        fn from_row(row: RowLabeled) -> Result<Self> {
            Ok(Self {
                id: AsValue::try_from_value(row.into_first().unwrap_or_default())?,
            })
        }
    }

    struct Broken;

    impl Entity for Broken {
        fn describe() -> EntitySchema {
            EntitySchema::new("broken")
                .property(PropertyDescriptor::new("A").key(KeyKind::Identity))
                .property(PropertyDescriptor::new("B").key(KeyKind::TriggerIdentity))
        }
        fn values(&self) -> Box<[(&'static str, Value)]> {
            Box::new([])
        }
        fn set_value(&mut self, property: &str, _value: Value) -> Result<()> {
            Err(StencilError::unmapped("broken", property))
        }
        fn from_row(_row: RowLabeled) -> Result<Self> {
            Ok(Broken)
        }
    }

    #[test]
    fn auto_mapper_picks_id() {
        let config = Configuration::default();
        let schema = config.schema::<Article>().unwrap();
        assert_eq!(schema.keys().count(), 1);
        assert_eq!(
            schema.find_property("id").unwrap().key_kind,
            KeyKind::Identity
        );
        let schema = config.schema::<Token>().unwrap();
        assert_eq!(schema.find_property("Id").unwrap().key_kind, KeyKind::Guid);
    }

    #[test]
    fn explicit_mapper_keeps_declaration() {
        let config = Configuration::builder().mapper(ExplicitMapper).build();
        let schema = config.schema::<Article>().unwrap();
        assert_eq!(schema.keys().count(), 0);
        assert_eq!(*schema, Article::describe());
    }

    #[test]
    fn schema_is_cached() {
        let config = Configuration::default();
        let first = config.schema::<Article>().unwrap();
        let second = config.schema::<Article>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        config.clear_cache();
        let third = config.schema::<Article>().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(first, third);
    }

    #[test]
    fn concurrent_resolution_converges() {
        let config = Arc::new(Configuration::default());
        let barrier = Arc::new(Barrier::new(8));
        let schemas = (0..8)
            .map(|_| {
                let config = config.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    config.schema::<Article>().unwrap()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        for schema in &schemas {
            assert!(Arc::ptr_eq(schema, &schemas[0]));
        }
    }

    #[test]
    fn overrides_take_precedence() {
        let config = Configuration::builder()
            .source(
                SchemaOverrides::new().with::<Article>(
                    EntitySchema::new("posts")
                        .schema_name("blog")
                        .property(PropertyDescriptor::new("Id").key(KeyKind::Assigned))
                        .property(PropertyDescriptor::new("Title").column("headline")),
                ),
            )
            .build();
        let schema = config.schema::<Article>().unwrap();
        assert_eq!(schema.table.full_name(), "blog.posts");
        assert_eq!(schema.keys().next().unwrap().key_kind, KeyKind::Assigned);
        assert_eq!(schema.find_property("title").unwrap().column_name, "headline");
        let schema = config.schema::<Token>().unwrap();
        assert_eq!(schema.table.name, "tokens");
    }

    #[test]
    fn invalid_keys_are_rejected() {
        let error = Configuration::default().schema::<Broken>().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<StencilError>(),
            Some(StencilError::KeyMisconfiguration { .. })
        ));
        let ignored_key = EntitySchema::new("t")
            .property(PropertyDescriptor::new("Id").key(KeyKind::Guid).ignored(true));
        assert!(ignored_key.validate().is_err());
    }

    #[test]
    fn key_value_of_entity() {
        let config = Configuration::default();
        let article = Article {
            id: 7,
            title: "x".into(),
        };
        let key = KeyValue::of(&article, &config.schema::<Article>().unwrap());
        assert_eq!(key, KeyValue::Scalar(Value::Int64(Some(7))));
        assert_eq!(key.as_scalar(), Some(&Value::Int64(Some(7))));
        let key = KeyValue::of(
            &article,
            &Configuration::builder()
                .mapper(ExplicitMapper)
                .build()
                .schema::<Article>()
                .unwrap(),
        );
        assert_eq!(key, KeyValue::Composite(vec![]));
    }

    #[test]
    fn ids_from_configured_generator() {
        let clock = Arc::new(ManualClock::new(SnowflakeGenerator::DEFAULT_EPOCH + 10));
        let generator = Arc::new(
            SnowflakeGenerator::new(WorkerId::new(1, 2).unwrap()).with_clock(clock.clone()),
        );
        let config = Configuration::builder()
            .id_generator(generator.clone())
            .build();
        let expected = (10u64 << 22) | (1 << 17) | (2 << 12);
        assert_eq!(config.next_id().unwrap(), expected.to_string());
        assert_eq!(config.next_id().unwrap(), (expected + 1).to_string());
        assert!(!config.new_guid().is_nil());
        assert!(Arc::ptr_eq(config.id_generator(), &generator));
        assert!(Arc::ptr_eq(
            Configuration::default().id_generator(),
            Configuration::default().id_generator()
        ));
    }
}
