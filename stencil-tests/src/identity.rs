use crate::{
    MockExecutor, Person, SensorReading, affected, error_kind, output, repository, row,
    statements, supports_identity,
};
use stencil::{ID_OUT_PARAM, KeyValue, SqlWriter, StencilError, Value};

fn identity_row() -> Vec<stencil::QueryResult> {
    vec![row(&["ID"], [Value::Int64(Some(42))]), affected(0)]
}

pub async fn identity<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = repository(dialect);
    let mut executor = MockExecutor::new(|query| {
        Ok(if query.sql.starts_with("INSERT") {
            let mut results = vec![affected(1)];
            if statements(query) > 1 {
                results.extend(identity_row());
            }
            results
        } else {
            identity_row()
        })
    });
    let mut person = Person::new("Alice", 31);
    let result = repository.insert(&mut executor, &mut person).await;
    if !supports_identity(dialect) {
        let error = result.expect_err("The identity insert should not be supported");
        assert!(matches!(
            error_kind(&error),
            Some(StencilError::Unsupported(..))
        ));
        assert!(executor.queries().is_empty(), "Nothing must be executed");
        assert_eq!(person.id, 0);
        return;
    }
    let key = result.expect("Failed to insert a person");
    assert_eq!(key, KeyValue::Scalar(Value::Int64(Some(42))));
    assert_eq!(person.id, 42);
    if dialect.supports_multiple_statements() {
        assert_eq!(executor.queries().len(), 1);
        assert_eq!(statements(&executor.queries()[0]), 2);
    } else {
        assert_eq!(executor.queries().len(), 2);
    }
    let insert = &executor.queries()[0];
    assert!(!insert.params.contains("id"), "The identity is never written");
    assert!(!insert.params.contains("nickname"));
    assert_eq!(
        insert.params.get("name"),
        Some(&Value::Varchar(Some("Alice".into())))
    );
    assert_eq!(insert.params.get("age"), Some(&Value::Int32(Some(31))));

    // No identity row
    let mut executor = MockExecutor::affecting_one();
    let mut person = Person::new("Bob", 20);
    let error = repository
        .insert(&mut executor, &mut person)
        .await
        .expect_err("The insert should fail without identity");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::InvalidState(..))
    ));
    assert_eq!(person.id, 0);
}

pub async fn trigger_identity<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = repository(dialect);
    let mut executor = MockExecutor::new(|_| Ok(vec![affected(1), output(ID_OUT_PARAM, 7i64)]));
    let mut reading = SensorReading {
        id: 0,
        reading: 1.5,
    };
    let key = repository
        .insert(&mut executor, &mut reading)
        .await
        .expect("Failed to insert a sensor reading");
    assert_eq!(key, KeyValue::Scalar(Value::Int64(Some(7))));
    assert_eq!(reading.id, 7);
    assert_eq!(executor.queries().len(), 1);
    let insert = &executor.queries()[0];
    assert!(insert.params.contains(ID_OUT_PARAM));
    assert!(!insert.params.contains("id"));
    assert_eq!(insert.params.get("reading"), Some(&Value::Float64(Some(1.5))));

    let mut executor = MockExecutor::affecting_one();
    let error = repository
        .insert(&mut executor, &mut reading)
        .await
        .expect_err("The insert should fail without the output parameter");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::InvalidState(..))
    ));
}
