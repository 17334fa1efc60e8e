#[cfg(test)]
mod tests {
    use indoc::indoc;
    use stencil::{Entity, ParameterBag, Predicate, Sort, SqlWriter, Value};
    use stencil_mysql::MySQLSqlWriter;
    use stencil_tests::{Membership, Person, PostTag, execute_tests, init_logs};

    const WRITER: MySQLSqlWriter = MySQLSqlWriter::new();

    #[tokio::test]
    async fn mysql() {
        init_logs();
        execute_tests(WRITER).await;
    }

    #[test]
    fn paged_select() {
        let schema = Person::describe();
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_select_paged(
                &mut out,
                &mut params,
                &schema,
                Some(&Predicate::ge("age", 30)),
                &[Sort::asc("name")],
                3,
                20,
            )
            .expect("Could not write the paged select");
        assert_eq!(
            out,
            indoc! {"
                SELECT SQL_CALC_FOUND_ROWS `id`, `full_name` AS `name`, `age`
                FROM `people`
                WHERE `age` >= @age_1
                ORDER BY `full_name` ASC
                LIMIT @firstResult, @maxResults;
                SELECT FOUND_ROWS() AS `TOTAL`
            "}
            .trim()
        );
        assert_eq!(params.get("age_1"), Some(&Value::Int32(Some(30))));
        assert_eq!(params.get("firstResult"), Some(&Value::UInt64(Some(40))));
        assert_eq!(params.get("maxResults"), Some(&Value::UInt64(Some(20))));
    }

    #[test]
    fn window() {
        let schema = Person::describe();
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_select_set(
                &mut out,
                &mut params,
                &schema,
                None,
                &[Sort::desc("age")],
                5,
                15,
            )
            .expect("Could not write the windowed select");
        assert_eq!(
            out,
            indoc! {"
                SELECT `id`, `full_name` AS `name`, `age`
                FROM `people`
                ORDER BY `age` DESC
                LIMIT @firstResult, @maxResults
            "}
            .trim()
        );
        let names = params.iter().map(|p| &*p.name).collect::<Vec<_>>();
        assert_eq!(names, ["firstResult", "maxResults"]);
    }

    #[test]
    fn upsert() {
        let rows = [
            Membership {
                user_id: 1,
                group_id: 7,
                role: "owner".into(),
            },
            Membership {
                user_id: 2,
                group_id: 7,
                role: "reader".into(),
            },
        ]
        .iter()
        .map(Entity::values)
        .collect::<Vec<_>>();
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_insert_many(&mut out, &mut params, &Membership::describe(), &rows, true)
            .expect("Could not write the upsert");
        assert_eq!(
            out,
            indoc! {"
                INSERT INTO `memberships` (`user_id`, `group_id`, `role`) VALUES
                (@user_id_0, @group_id_0, @role_0),
                (@user_id_1, @group_id_1, @role_1)
                ON DUPLICATE KEY UPDATE
                `role` = VALUES(`role`)
            "}
            .trim()
        );
        assert_eq!(params.len(), 6);
        assert_eq!(params.get("role_1"), Some(&Value::Varchar(Some("reader".into()))));
    }

    #[test]
    fn upsert_keys_only() {
        let rows = [PostTag {
            post_id: 4,
            tag: "rust".into(),
        }]
        .iter()
        .map(Entity::values)
        .collect::<Vec<_>>();
        let mut out = String::new();
        WRITER
            .write_insert_many(&mut out, &mut ParameterBag::new(), &PostTag::describe(), &rows, true)
            .expect("Could not write the upsert");
        assert_eq!(
            out,
            indoc! {"
                INSERT INTO `post_tags` (`post_id`, `tag`) VALUES
                (@post_id_0, @tag_0)
                ON DUPLICATE KEY UPDATE
                `post_id` = VALUES(`post_id`)
            "}
            .trim()
        );
    }

    #[test]
    fn identity() {
        let schema = Person::describe();
        let person = Person::new("Ada", 36);
        let mut out = String::new();
        let mut params = ParameterBag::new();
        WRITER
            .write_insert(&mut out, &mut params, &schema, &person.values())
            .expect("Could not write the insert");
        out.push_str(WRITER.batch_separator());
        WRITER
            .write_identity(&mut out, &schema)
            .expect("Could not write the identity select");
        assert_eq!(
            out,
            indoc! {"
                INSERT INTO `people` (`full_name`, `age`) VALUES
                (@name, @age);
                SELECT CONVERT(LAST_INSERT_ID(), SIGNED INTEGER) AS `ID`
            "}
            .trim()
        );
    }

    #[test]
    fn quoting() {
        let mut out = String::new();
        WRITER.write_identifier_quoted(&Default::default(), &mut out, "odd`name");
        assert_eq!(out, "`odd``name`");
    }
}
