use crate::{MockExecutor, Membership, Note, Person, affected, error_kind, silent_logs};
use std::sync::Arc;
use stencil::{
    Configuration, ExplicitMapper, Predicate, Repository, SqlWriter, StencilError, Value,
};

pub async fn modify<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = crate::repository(dialect);
    let person = Person {
        id: 5,
        name: "Dana".into(),
        age: 52,
        nickname: Some("D".into()),
    };

    // Update by key
    let mut executor = MockExecutor::new(|_| Ok(vec![affected(1)]));
    assert!(
        repository
            .update(&mut executor, &person, false)
            .await
            .expect("Failed to update a person")
    );
    let query = executor.last().expect("The update was not executed");
    assert!(query.sql.starts_with("UPDATE "));
    assert!(!query.params.contains("id"), "Identity keys are never set");
    assert_eq!(query.params.get("id_3"), Some(&Value::Int64(Some(5))));
    assert_eq!(query.params.get("age"), Some(&Value::Int32(Some(52))));
    assert!(!query.params.contains("nickname"));

    let mut executor = MockExecutor::new(|_| Ok(vec![affected(0)]));
    assert!(
        !repository
            .update(&mut executor, &person, false)
            .await
            .expect("Failed to update a person"),
        "No row matched"
    );

    // Keys are kept out of the SET list on request
    let membership = Membership {
        user_id: 1,
        group_id: 2,
        role: "owner".into(),
    };
    repository
        .update(&mut executor, &membership, true)
        .await
        .expect("Failed to update a membership");
    let query = executor.last().expect("The update was not executed");
    assert!(!query.params.contains("user_id"));
    assert!(!query.params.contains("group_id"));
    assert!(query.params.contains("user_id_2"));
    assert!(query.params.contains("group_id_3"));

    // Update matching a predicate
    let mut executor = MockExecutor::new(|_| Ok(vec![affected(4)]));
    let count = repository
        .update_where(&mut executor, &person, &Predicate::lt("age", 18), true)
        .await
        .expect("Failed to update the minors");
    assert_eq!(count, 4);

    // Keyless entities cannot be addressed
    let explicit = Repository::new(Arc::new(
        Configuration::builder()
            .dialect(dialect.clone())
            .mapper(ExplicitMapper)
            .build(),
    ));
    let note = Note {
        id: 1,
        body: "text".into(),
    };
    let error = explicit
        .update(&mut executor, &note, false)
        .await
        .expect_err("A keyless entity cannot be updated");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::KeyMisconfiguration { .. })
    ));
    let error = explicit
        .delete(&mut executor, &note)
        .await
        .expect_err("A keyless entity cannot be deleted");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::KeyMisconfiguration { .. })
    ));

    // Delete
    let mut executor = MockExecutor::new(|_| Ok(vec![affected(1)]));
    assert!(
        repository
            .delete(&mut executor, &person)
            .await
            .expect("Failed to delete a person")
    );
    let query = executor.last().expect("The delete was not executed");
    assert!(query.sql.starts_with("DELETE FROM "));
    assert_eq!(query.params.len(), 1);

    let mut executor = MockExecutor::new(|_| Ok(vec![affected(0)]));
    let deleted;
    silent_logs! {
        deleted = repository.delete(&mut executor, &person).await;
    }
    assert!(!deleted.expect("Failed to delete a person"));

    let mut executor = MockExecutor::new(|_| Ok(vec![affected(7)]));
    let count = repository
        .delete_where::<Person, _>(&mut executor, &Predicate::is_in("id", [1i64, 2, 3]))
        .await
        .expect("Failed to delete the people");
    assert_eq!(count, 7);
    assert_eq!(executor.last().map(|q| q.params.len()), Some(3));
}
