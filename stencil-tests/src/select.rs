use crate::{MockExecutor, Person, affected, error_kind, repository, row};
use stencil::{
    KeyValue, ParameterBag, Predicate, QueryResult, Sort, SqlWriter, StencilError, Value,
    stream::TryStreamExt,
};

pub fn person_row(person: &Person) -> QueryResult {
    row(
        &["id", "name", "age"],
        [
            Value::Int64(Some(person.id)),
            Value::Varchar(Some(person.name.clone())),
            Value::Int32(Some(person.age)),
        ],
    )
}

pub async fn select<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = repository(dialect);
    let people = [
        Person {
            id: 1,
            name: "Alice".into(),
            age: 31,
            nickname: None,
        },
        Person {
            id: 2,
            name: "Bob".into(),
            age: 44,
            nickname: None,
        },
    ];
    let mut executor = MockExecutor::replaying(
        people
            .iter()
            .map(person_row)
            .chain([affected(0)])
            .collect(),
    );

    // Range on the same property
    let adults = Predicate::and([Predicate::gt("age", 18), Predicate::lt("age", 65)]);
    let found = repository
        .get_list::<Person, _>(&mut executor, Some(&adults), &[Sort::asc("name")])
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to list the people");
    assert_eq!(found, people);
    let query = executor.last().expect("The select was not executed");
    let schema = repository.config().schema::<Person>().unwrap();
    let mut params = ParameterBag::new();
    let condition = adults
        .compile(dialect, &schema, &mut params)
        .expect("Failed to compile the predicate");
    assert!(query.sql.contains(&format!("\nWHERE {condition}")));
    assert_eq!(query.params, params);
    assert_eq!(query.params.get("age_1"), Some(&Value::Int32(Some(18))));
    assert_eq!(query.params.get("age_2"), Some(&Value::Int32(Some(65))));
    let prefix = dialect.parameter_prefix();
    assert!(condition.contains(&format!("{prefix}age_1")));
    assert!(condition.contains(&format!("{prefix}age_2")));
    assert!(!query.sql.contains("nickname"), "Ignored properties are never read");

    // By key
    let person = repository
        .get::<Person, _>(&mut executor, KeyValue::scalar(1i64))
        .await
        .expect("Failed to get a person");
    assert_eq!(person.as_ref(), Some(&people[0]));
    let query = executor.last().expect("The select was not executed");
    assert_eq!(query.params.get("id_1"), Some(&Value::Int64(Some(1))));

    let mut empty = MockExecutor::replaying(vec![affected(0)]);
    let person = repository
        .get::<Person, _>(&mut empty, Value::Int64(Some(99)))
        .await
        .expect("Failed to get a person");
    assert_eq!(person, None);

    // Subset of columns
    let mut executor = MockExecutor::replaying(vec![
        row(&["name"], [Value::Varchar(Some("Carol".into()))]),
        affected(0),
    ]);
    let found = repository
        .get_list_columns::<Person, _>(&mut executor, &["name"], None, &[])
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to list the names");
    assert_eq!(
        found,
        [Person {
            name: "Carol".into(),
            ..Default::default()
        }]
    );
    assert!(!executor.last_sql().contains("age"));
    let error = repository
        .get_list_columns::<Person, _>(&mut executor, &["nickname"], None, &[])
        .try_collect::<Vec<_>>()
        .await
        .expect_err("Ignored properties cannot be selected");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::UnmappedProperty { .. })
    ));

    // Aggregates
    let mut executor = MockExecutor::new(|query| {
        let value = if query.sql.contains("COUNT(") {
            Value::Int64(Some(2))
        } else if query.sql.contains("MAX(") {
            Value::Int32(Some(44))
        } else if query.sql.contains("SUM(") {
            Value::Int64(Some(75))
        } else {
            Value::Null
        };
        Ok(vec![row(&["VALUE"], [value]), affected(0)])
    });
    assert_eq!(
        repository
            .count::<Person, _>(&mut executor, None)
            .await
            .expect("Failed to count the people"),
        2
    );
    assert_eq!(
        repository
            .count::<Person, _>(&mut executor, Some(&adults))
            .await
            .expect("Failed to count the adults"),
        2
    );
    assert!(executor.last_sql().contains("WHERE"));
    assert_eq!(
        repository
            .max::<Person, _>(&mut executor, "age", None)
            .await
            .expect("Failed to compute the maximum age"),
        Value::Int32(Some(44))
    );
    assert_eq!(
        repository
            .sum::<Person, _>(&mut executor, "Age", Some(&adults))
            .await
            .expect("Failed to compute the total age"),
        Value::Int64(Some(75))
    );
    assert!(
        repository
            .min::<Person, _>(&mut executor, "age", None)
            .await
            .expect("Failed to compute the minimum age")
            .is_null()
    );
    let error = repository
        .avg::<Person, _>(&mut executor, "height", None)
        .await
        .expect_err("Unknown properties cannot be aggregated");
    match error_kind(&error) {
        Some(StencilError::UnmappedProperty { entity, property }) => {
            assert_eq!(entity, "people");
            assert_eq!(property, "height");
        }
        other => panic!("Unexpected error {other:?}"),
    }

    // A count must return its row
    let mut executor = MockExecutor::replaying(vec![affected(0)]);
    let error = repository
        .count::<Person, _>(&mut executor, None)
        .await
        .expect_err("A count without row is not zero");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::InvalidState(..))
    ));
}
