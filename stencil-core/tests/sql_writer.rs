#[cfg(test)]
mod tests {
    use indoc::indoc;
    use stencil_core::{
        Aggregate, Direction, EntitySchema, GenericSqlWriter, ID_OUT_PARAM, JoinType, KeyKind,
        ParameterBag, Predicate, PropertyDescriptor, Sort, SqlWriter, StencilError, Value,
        writer::Context,
    };

    const WRITER: GenericSqlWriter = GenericSqlWriter::new();

    fn people() -> EntitySchema {
        EntitySchema::new("people")
            .property(
                PropertyDescriptor::new("Id")
                    .key(KeyKind::Identity)
                    .value(Value::Int64(None)),
            )
            .property(
                PropertyDescriptor::new("Name")
                    .column("full_name")
                    .value(Value::Varchar(None)),
            )
            .property(PropertyDescriptor::new("Age").value(Value::Int32(None)))
            .property(PropertyDescriptor::new("Created").read_only(true))
            .property(PropertyDescriptor::new("Nickname").ignored(true))
    }

    fn person(name: &str, age: i32) -> Vec<(&'static str, Value)> {
        vec![
            ("Id", Value::Int64(None)),
            ("Name", Value::Varchar(Some(name.into()))),
            ("Age", Value::Int32(Some(age))),
            ("Created", Value::Null),
        ]
    }

    fn kind(error: &stencil_core::Error) -> Option<&StencilError> {
        error.downcast_ref::<StencilError>()
    }

    #[test]
    fn identifiers() {
        let mut out = String::new();
        WRITER.write_identifier_quoted(&Context::default(), &mut out, r#"we"ird"#);
        assert_eq!(out, r#""we""ird""#);

        let schema = EntitySchema::new("people")
            .schema_name("hr")
            .property(PropertyDescriptor::new("Id"));
        let mut out = String::new();
        WRITER
            .write_select(&mut out, &mut ParameterBag::new(), &schema, None, None, &[])
            .unwrap();
        assert_eq!(out, "SELECT \"Id\"\nFROM \"hr\".\"people\"");
    }

    #[test]
    fn select() {
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_select(&mut out, &mut params, &people(), None, None, &[])
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                SELECT "Id", "full_name" AS "Name", "Age", "Created"
                FROM "people"
            "#}
            .trim_end()
        );
        assert!(params.is_empty());

        let mut out = String::new();
        WRITER
            .write_select(
                &mut out,
                &mut params,
                &people(),
                Some(&["name", "Age"]),
                Some(&Predicate::eq("Age", 30)),
                &[Sort::asc("Name"), Sort::desc("Id")],
            )
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                SELECT "full_name" AS "Name", "Age"
                FROM "people"
                WHERE "Age" = @Age_1
                ORDER BY "full_name" ASC, "Id" DESC
            "#}
            .trim_end()
        );
        assert_eq!(params.get("Age_1"), Some(&Value::Int32(Some(30))));
    }

    #[test]
    fn select_unknown_column() {
        let mut out = String::new();
        let error = WRITER
            .write_select(
                &mut out,
                &mut ParameterBag::new(),
                &people(),
                Some(&["Nickname"]),
                None,
                &[],
            )
            .unwrap_err();
        assert!(matches!(
            kind(&error),
            Some(StencilError::UnmappedProperty { .. })
        ));
        let error = WRITER
            .write_select(
                &mut out,
                &mut ParameterBag::new(),
                &people(),
                None,
                None,
                &[Sort::asc("Height")],
            )
            .unwrap_err();
        assert!(matches!(
            kind(&error),
            Some(StencilError::UnmappedProperty { .. })
        ));
    }

    #[test]
    fn paged() {
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_select_paged(
                &mut out,
                &mut params,
                &people(),
                Some(&Predicate::gt("Age", 18)),
                &[Sort::asc("Id")],
                2,
                10,
            )
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                SELECT "Id", "full_name" AS "Name", "Age", "Created"
                FROM "people"
                WHERE "Age" > @Age_1
                ORDER BY "Id" ASC
                LIMIT @maxResults OFFSET @firstResult;
                SELECT COUNT(*) AS "TOTAL" FROM (SELECT "Id", "full_name" AS "Name", "Age", "Created"
                FROM "people"
                WHERE "Age" > @Age_1
                ORDER BY "Id" ASC) AS "counted"
            "#}
            .trim_end()
        );
        assert_eq!(params.get("maxResults"), Some(&Value::UInt64(Some(10))));
        assert_eq!(params.get("firstResult"), Some(&Value::UInt64(Some(10))));
        assert_eq!(params.get("Age_1"), Some(&Value::Int32(Some(18))));
    }

    #[test]
    fn paged_first_page() {
        for page in [0, 1] {
            let mut params = ParameterBag::new();
            WRITER
                .write_select_paged(
                    &mut String::new(),
                    &mut params,
                    &people(),
                    None,
                    &[Sort::asc("Id")],
                    page,
                    25,
                )
                .unwrap();
            assert_eq!(params.get("firstResult"), Some(&Value::UInt64(Some(0))));
            assert_eq!(params.get("maxResults"), Some(&Value::UInt64(Some(25))));
        }
    }

    #[test]
    fn paging_requires_sort() {
        let error = WRITER
            .write_select_paged(
                &mut String::new(),
                &mut ParameterBag::new(),
                &people(),
                None,
                &[],
                1,
                10,
            )
            .unwrap_err();
        assert!(matches!(kind(&error), Some(StencilError::MissingInput(..))));
        let error = WRITER
            .write_select_set(
                &mut String::new(),
                &mut ParameterBag::new(),
                &people(),
                None,
                &[],
                0,
                10,
            )
            .unwrap_err();
        assert!(matches!(kind(&error), Some(StencilError::MissingInput(..))));
    }

    #[test]
    fn window() {
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_select_set(
                &mut out,
                &mut params,
                &people(),
                None,
                &[Sort::desc("Age")],
                5,
                3,
            )
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                SELECT "Id", "full_name" AS "Name", "Age", "Created"
                FROM "people"
                ORDER BY "Age" DESC
                LIMIT @maxResults OFFSET @firstResult
            "#}
            .trim_end()
        );
        assert_eq!(params.get("firstResult"), Some(&Value::UInt64(Some(5))));
        assert_eq!(params.get("maxResults"), Some(&Value::UInt64(Some(3))));
    }

    #[test]
    fn aggregates() {
        let mut out = String::new();
        WRITER
            .write_count(&mut out, &mut ParameterBag::new(), &people(), None)
            .unwrap();
        assert_eq!(out, "SELECT COUNT(*) AS \"TOTAL\"\nFROM \"people\"");

        let expected = [
            (Aggregate::Max, r#"SELECT MAX("Age") AS "MAXVAL""#),
            (Aggregate::Min, r#"SELECT MIN("Age") AS "MINVAL""#),
            (Aggregate::Sum, r#"SELECT SUM("Age") AS "SUMVAL""#),
            (Aggregate::Avg, r#"SELECT AVG("Age") AS "AVGVAL""#),
        ];
        for (aggregate, head) in expected {
            let mut out = String::new();
            let mut params = ParameterBag::new();
            WRITER
                .write_aggregate(
                    &mut out,
                    &mut params,
                    &people(),
                    aggregate,
                    Some("age"),
                    Some(&Predicate::like("Name", "A%")),
                )
                .unwrap();
            assert_eq!(
                out,
                format!("{head}\nFROM \"people\"\nWHERE \"full_name\" LIKE @Name_1")
            );
            assert_eq!(params.len(), 1);
        }

        let error = WRITER
            .write_aggregate(
                &mut String::new(),
                &mut ParameterBag::new(),
                &people(),
                Aggregate::Max,
                Some("Height"),
                None,
            )
            .unwrap_err();
        match kind(&error) {
            Some(StencilError::UnmappedProperty { entity, .. }) => assert_eq!(entity, "people"),
            other => panic!("Unexpected error {other:?}"),
        }
        let error = WRITER
            .write_aggregate(
                &mut String::new(),
                &mut ParameterBag::new(),
                &people(),
                Aggregate::Sum,
                None,
                None,
            )
            .unwrap_err();
        assert!(matches!(kind(&error), Some(StencilError::MissingInput(..))));
    }

    #[test]
    fn insert() {
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_insert(&mut out, &mut params, &people(), &person("Ann", 30))
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                INSERT INTO "people" ("full_name", "Age") VALUES
                (@Name, @Age)
            "#}
            .trim_end()
        );
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("Name"), Some(&Value::Varchar(Some("Ann".into()))));
        assert_eq!(params.get("Age"), Some(&Value::Int32(Some(30))));
    }

    #[test]
    fn insert_missing_value_uses_prototype() {
        let mut params = ParameterBag::new();
        WRITER
            .write_insert(
                &mut String::new(),
                &mut params,
                &people(),
                &[("Name", "Bob".into())],
            )
            .unwrap();
        assert_eq!(params.get("Age"), Some(&Value::Int32(None)));
    }

    #[test]
    fn insert_trigger_identity() {
        let orders = EntitySchema::new("orders")
            .property(
                PropertyDescriptor::new("Id")
                    .key(KeyKind::TriggerIdentity)
                    .value(Value::Int64(None)),
            )
            .property(PropertyDescriptor::new("Total"));
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_insert(
                &mut out,
                &mut params,
                &orders,
                &[("Id", Value::Int64(None)), ("Total", 12.5.into())],
            )
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                INSERT INTO "orders" ("Total") VALUES
                (@Total)
                RETURNING "Id" INTO @IdOutParam
            "#}
            .trim_end()
        );
        let output = params.iter().find(|p| p.name == ID_OUT_PARAM).unwrap();
        assert_eq!(output.direction, Direction::Output);
        assert_eq!(output.value, Value::Int64(None));
    }

    #[test]
    fn insert_without_columns() {
        let counters =
            EntitySchema::new("counters").property(PropertyDescriptor::new("Id").key(KeyKind::Identity));
        let error = WRITER
            .write_insert(&mut String::new(), &mut ParameterBag::new(), &counters, &[])
            .unwrap_err();
        assert!(matches!(kind(&error), Some(StencilError::NoColumns(..))));
    }

    #[test]
    fn insert_many() {
        let rows = (0..3)
            .map(|i| person(&format!("P{i}"), 20 + i).into_boxed_slice())
            .collect::<Vec<_>>();
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_insert_many(&mut out, &mut params, &people(), &rows, false)
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                INSERT INTO "people" ("full_name", "Age") VALUES
                (@Name_0, @Age_0),
                (@Name_1, @Age_1),
                (@Name_2, @Age_2)
            "#}
            .trim_end()
        );
        assert_eq!(params.len(), 3 * 2);
        assert_eq!(params.get("Name_2"), Some(&Value::Varchar(Some("P2".into()))));
        assert_eq!(params.get("Age_1"), Some(&Value::Int32(Some(21))));

        let mut out = String::new();
        WRITER
            .write_insert_many(&mut out, &mut ParameterBag::new(), &people(), &[], false)
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn insert_many_tuple_count() {
        for n in [1usize, 7, 50] {
            let rows = (0..n)
                .map(|i| person("x", i as i32).into_boxed_slice())
                .collect::<Vec<_>>();
            let mut out = String::new();
            let mut params = ParameterBag::new();
            WRITER
                .write_insert_many(&mut out, &mut params, &people(), &rows, false)
                .unwrap();
            assert_eq!(out.matches("(@Name_").count(), n);
            assert_eq!(params.len(), n * 2);
        }
    }

    #[test]
    fn upsert() {
        let tags = EntitySchema::new("tags")
            .property(PropertyDescriptor::new("Code").key(KeyKind::Assigned))
            .property(PropertyDescriptor::new("Label"))
            .property(PropertyDescriptor::new("Weight"));
        let rows: Vec<Box<[(&'static str, Value)]>> = vec![
            vec![
                ("Code", "a".into()),
                ("Label", "A".into()),
                ("Weight", 1.into()),
            ]
            .into_boxed_slice(),
        ];
        let mut out = String::new();
        WRITER
            .write_insert_many(&mut out, &mut ParameterBag::new(), &tags, &rows, true)
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                INSERT INTO "tags" ("Code", "Label", "Weight") VALUES
                (@Code_0, @Label_0, @Weight_0)
                ON CONFLICT ("Code") DO UPDATE SET
                "Label" = EXCLUDED."Label",
                "Weight" = EXCLUDED."Weight"
            "#}
            .trim_end()
        );

        let keyless = EntitySchema::new("logs").property(PropertyDescriptor::new("Line"));
        let rows: Vec<Box<[(&'static str, Value)]>> =
            vec![vec![("Line", "x".into())].into_boxed_slice()];
        let error = WRITER
            .write_insert_many(&mut String::new(), &mut ParameterBag::new(), &keyless, &rows, true)
            .unwrap_err();
        assert!(matches!(
            kind(&error),
            Some(StencilError::KeyMisconfiguration { .. })
        ));
    }

    #[test]
    fn upsert_keys_only() {
        let links = EntitySchema::new("tags")
            .property(PropertyDescriptor::new("a").key(KeyKind::Assigned))
            .property(PropertyDescriptor::new("b").key(KeyKind::Assigned));
        let rows: Vec<Box<[(&'static str, Value)]>> =
            vec![vec![("a", 1.into()), ("b", 2.into())].into_boxed_slice()];
        let mut out = String::new();
        WRITER
            .write_insert_many(&mut out, &mut ParameterBag::new(), &links, &rows, true)
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                INSERT INTO "tags" ("a", "b") VALUES
                (@a_0, @b_0)
                ON CONFLICT ("a", "b") DO NOTHING
            "#}
            .trim_end()
        );
    }

    #[test]
    fn update() {
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_update(
                &mut out,
                &mut params,
                &people(),
                &person("Ann", 31),
                Some(&Predicate::eq("Id", 3)),
                false,
            )
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                UPDATE "people"
                SET "full_name" = @Name, "Age" = @Age
                WHERE "Id" = @Id_3
            "#}
            .trim_end()
        );
        assert_eq!(params.get("Id_3"), Some(&Value::Int32(Some(3))));
    }

    #[test]
    fn update_keys() {
        let docs = EntitySchema::new("docs")
            .property(PropertyDescriptor::new("Id").key(KeyKind::Guid))
            .property(PropertyDescriptor::new("Title"));
        let values = [("Id", Value::Uuid(None)), ("Title", "t".into())];
        let predicate = Predicate::eq("Title", "old");
        let mut out = String::new();
        WRITER
            .write_update(
                &mut out,
                &mut ParameterBag::new(),
                &docs,
                &values,
                Some(&predicate),
                false,
            )
            .unwrap();
        assert_eq!(
            out,
            "UPDATE \"docs\"\nSET \"Id\" = @Id, \"Title\" = @Title\nWHERE \"Title\" = @Title_3"
        );
        let mut out = String::new();
        WRITER
            .write_update(
                &mut out,
                &mut ParameterBag::new(),
                &docs,
                &values,
                Some(&predicate),
                true,
            )
            .unwrap();
        assert_eq!(
            out,
            "UPDATE \"docs\"\nSET \"Title\" = @Title\nWHERE \"Title\" = @Title_2"
        );
    }

    #[test]
    fn update_errors() {
        let error = WRITER
            .write_update(
                &mut String::new(),
                &mut ParameterBag::new(),
                &people(),
                &person("Ann", 1),
                None,
                false,
            )
            .unwrap_err();
        assert!(matches!(kind(&error), Some(StencilError::MissingInput(..))));
        let counters = EntitySchema::new("counters")
            .property(PropertyDescriptor::new("Id").key(KeyKind::Identity));
        let error = WRITER
            .write_update(
                &mut String::new(),
                &mut ParameterBag::new(),
                &counters,
                &[],
                Some(&Predicate::eq("Id", 1)),
                false,
            )
            .unwrap_err();
        assert!(matches!(kind(&error), Some(StencilError::NoColumns(..))));
    }

    #[test]
    fn delete() {
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_delete(
                &mut out,
                &mut params,
                &people(),
                Some(&Predicate::is_in("Id", [1, 2])),
            )
            .unwrap();
        assert_eq!(out, "DELETE FROM \"people\"\nWHERE \"Id\" IN (@Id_1, @Id_2)");
        let error = WRITER
            .write_delete(&mut String::new(), &mut params, &people(), None)
            .unwrap_err();
        assert!(matches!(kind(&error), Some(StencilError::MissingInput(..))));
    }

    #[test]
    fn join() {
        let books = EntitySchema::new("books")
            .property(PropertyDescriptor::new("Id").key(KeyKind::Identity))
            .property(PropertyDescriptor::new("Title"))
            .property(PropertyDescriptor::new("AuthorId"))
            .property(PropertyDescriptor::new("PublisherId"));
        let authors = EntitySchema::new("authors")
            .property(PropertyDescriptor::new("Id").key(KeyKind::Identity))
            .property(PropertyDescriptor::new("Name"));
        let publishers = EntitySchema::new("publishers")
            .property(PropertyDescriptor::new("Code").key(KeyKind::Assigned))
            .property(PropertyDescriptor::new("Name"));
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_select_join(
                &mut out,
                &mut params,
                &books,
                &[("AuthorId", &authors), ("PublisherId", &publishers)],
                JoinType::Left,
                Some(&Predicate::eq("Title", "Dune")),
                &[Sort::asc("Title")],
            )
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                SELECT *
                FROM "books"
                LEFT JOIN "authors" ON "books"."AuthorId" = "authors"."Id"
                LEFT JOIN "publishers" ON "books"."PublisherId" = "publishers"."Code"
                WHERE "books"."Title" = @Title_1
                ORDER BY "books"."Title" ASC
            "#}
            .trim_end()
        );

        let expected = [
            (JoinType::Default, "JOIN"),
            (JoinType::Inner, "INNER JOIN"),
            (JoinType::Right, "RIGHT JOIN"),
            (JoinType::Outer, "FULL OUTER JOIN"),
        ];
        for (join, keyword) in expected {
            let mut out = String::new();
            WRITER
                .write_select_join(
                    &mut out,
                    &mut ParameterBag::new(),
                    &books,
                    &[("AuthorId", &authors)],
                    join,
                    None,
                    &[],
                )
                .unwrap();
            assert!(
                out.contains(&format!("\n{keyword} \"authors\" ON")),
                "{out}"
            );
        }

        let keyless = EntitySchema::new("notes").property(PropertyDescriptor::new("Text"));
        let error = WRITER
            .write_select_join(
                &mut String::new(),
                &mut ParameterBag::new(),
                &books,
                &[("AuthorId", &keyless)],
                JoinType::Inner,
                None,
                &[],
            )
            .unwrap_err();
        assert!(matches!(
            kind(&error),
            Some(StencilError::KeyMisconfiguration { .. })
        ));
    }

    #[test]
    fn join_relational() {
        let books = EntitySchema::new("books")
            .property(PropertyDescriptor::new("Id").key(KeyKind::Identity))
            .property(PropertyDescriptor::new("Title"))
            .property(PropertyDescriptor::new("AuthorId"));
        let authors = EntitySchema::new("authors")
            .property(PropertyDescriptor::new("Id").key(KeyKind::Identity))
            .property(PropertyDescriptor::new("Name").column("full_name"))
            .property(PropertyDescriptor::new("Cache").ignored(true));
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_select_relational(
                &mut out,
                &mut params,
                &books,
                &[("AuthorId", &authors)],
                JoinType::Inner,
                Some(&Predicate::eq("Title", "Dune")),
                &[],
            )
            .unwrap();
        assert_eq!(
            out,
            indoc! {r#"
                SELECT "books"."Id" AS "t0_Id",
                "books"."Title" AS "t0_Title",
                "books"."AuthorId" AS "t0_AuthorId",
                "authors"."Id" AS "t1_Id",
                "authors"."full_name" AS "t1_full_name"
                FROM "books"
                INNER JOIN "authors" ON "books"."AuthorId" = "authors"."Id"
                WHERE "books"."Title" = @Title_1
            "#}
            .trim_end()
        );
    }

    #[test]
    fn identity() {
        let mut out = String::new();
        WRITER.write_identity(&mut out, &people()).unwrap();
        assert_eq!(out, r#"SELECT LASTVAL() AS "ID""#);
        assert!(WRITER.supports_multiple_statements());
        assert_eq!(WRITER.batch_separator(), ";");
    }
}
