#[cfg(test)]
mod tests {
    use indoc::indoc;
    use stencil::{Entity, KeyValue, ParameterBag, Predicate, SqlWriter, Value};
    use stencil_sqlite::SqliteSqlWriter;
    use stencil_tests::{Membership, Person, execute_tests, init_logs};

    const WRITER: SqliteSqlWriter = SqliteSqlWriter::new();

    #[tokio::test]
    async fn sqlite() {
        init_logs();
        execute_tests(WRITER).await;
    }

    #[test]
    fn update_by_key() {
        let schema = Person::describe();
        let person = Person {
            id: 12,
            name: "Grace".into(),
            age: 85,
            nickname: None,
        };
        let predicate = Predicate::by_key(&person, &schema).expect("Person has a key");
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_update(
                &mut out,
                &mut params,
                &schema,
                &person.values(),
                Some(&predicate),
                false,
            )
            .expect("Could not write the update");
        assert_eq!(
            out,
            indoc! {r#"
                UPDATE "people"
                SET "full_name" = @name, "age" = @age
                WHERE "id" = @id_3
            "#}
            .trim()
        );
        assert_eq!(params.get("id_3"), Some(&Value::Int64(Some(12))));
    }

    #[test]
    fn delete_by_composite_key() {
        let schema = Membership::describe();
        let id = KeyValue::composite([("user_id", 4i64), ("group_id", 2i64)]);
        let predicate = Predicate::by_id(&id, &schema).expect("Membership has two keys");
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_delete(&mut out, &mut params, &schema, Some(&predicate))
            .expect("Could not write the delete");
        assert_eq!(
            out,
            indoc! {r#"
                DELETE FROM "memberships"
                WHERE ("user_id" = @user_id_1 AND "group_id" = @group_id_2)
            "#}
            .trim()
        );
    }

    #[test]
    fn aggregate() {
        let schema = Person::describe();
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_aggregate(
                &mut out,
                &mut params,
                &schema,
                stencil::Aggregate::Max,
                Some("age"),
                Some(&Predicate::like("name", "G%").not()),
            )
            .expect("Could not write the aggregate");
        assert_eq!(
            out,
            indoc! {r#"
                SELECT MAX("age") AS "MAXVAL"
                FROM "people"
                WHERE NOT ("full_name" LIKE @name_1)
            "#}
            .trim()
        );
    }

    #[test]
    fn identity() {
        let mut out = String::new();
        WRITER
            .write_identity(&mut out, &Person::describe())
            .expect("Could not write the identity select");
        assert_eq!(out, r#"SELECT LAST_INSERT_ROWID() AS "ID""#);
    }
}
