use crate::{Department, Employee, MockExecutor, Note, affected, error_kind, row};
use std::sync::Arc;
use stencil::{
    Configuration, ExplicitMapper, JoinType, Predicate, Relations, Repository, Sort, SqlWriter,
    StencilError, Value, stream::TryStreamExt,
};

pub async fn join<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = crate::repository(dialect);
    let mut executor = MockExecutor::replaying(vec![
        row(
            &["id", "name", "department_id", "id", "title"],
            [
                Value::Int64(Some(1)),
                Value::Varchar(Some("Erin".into())),
                Value::Int64(Some(3)),
                Value::Int64(Some(3)),
                Value::Varchar(Some("Research".into())),
            ],
        ),
        affected(0),
    ]);
    let relations = Relations::new().with::<Department>("department_id");
    let rows = repository
        .select_join::<Employee, _>(
            &mut executor,
            &relations,
            JoinType::Left,
            Some(&Predicate::like("name", "E%")),
            &[Sort::asc("name")],
        )
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to join employees and departments");
    assert_eq!(rows.len(), 1);
    assert_eq!(
        rows[0].get_column("title"),
        Some(&Value::Varchar(Some("Research".into())))
    );
    let sql = executor.last_sql();
    assert!(sql.starts_with("SELECT *"));
    assert!(sql.contains("\nLEFT JOIN "));
    assert!(sql.contains("department_id"));
    assert!(sql.contains("\nWHERE "));
    assert!(sql.contains("\nORDER BY "));

    let rows = repository
        .select_join::<Employee, _>(
            &mut executor,
            &relations,
            JoinType::Inner,
            None,
            &[],
        )
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to join employees and departments");
    assert_eq!(rows.len(), 1);
    assert!(executor.last_sql().contains("\nINNER JOIN "));

    // Decoded into entities
    let mut executor = MockExecutor::replaying(vec![
        row(
            &["t0_id", "t0_name", "t0_department_id", "t1_id", "t1_title"],
            [
                Value::Int64(Some(1)),
                Value::Varchar(Some("Erin".into())),
                Value::Int64(Some(3)),
                Value::Int64(Some(3)),
                Value::Varchar(Some("Research".into())),
            ],
        ),
        row(
            &["T0_ID", "T0_NAME", "T0_DEPARTMENT_ID", "T1_ID", "T1_TITLE"],
            [
                Value::Int64(Some(2)),
                Value::Varchar(Some("Eve".into())),
                Value::Int64(Some(8)),
                Value::Int64(None),
                Value::Varchar(None),
            ],
        ),
        affected(0),
    ]);
    let joined = repository
        .select_join_as::<Employee, Department, _>(
            &mut executor,
            "department_id",
            JoinType::Left,
            Some(&Predicate::like("name", "E%")),
            &[Sort::asc("id")],
        )
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to decode the joined entities");
    assert_eq!(
        joined,
        [
            (
                Employee {
                    id: 1,
                    name: "Erin".into(),
                    department_id: 3,
                },
                Some(Department {
                    id: 3,
                    title: "Research".into(),
                }),
            ),
            (
                Employee {
                    id: 2,
                    name: "Eve".into(),
                    department_id: 8,
                },
                None,
            ),
        ]
    );
    let sql = executor.last_sql();
    assert!(!sql.starts_with("SELECT *"));
    for label in ["t0_id", "t0_name", "t0_department_id", "t1_id", "t1_title"] {
        assert!(sql.contains(label), "{label} is projected");
    }
    assert!(sql.contains("\nLEFT JOIN "));

    let rows = repository
        .select_relational::<Employee, _>(
            &mut executor,
            &relations,
            JoinType::Left,
            None,
            &[],
        )
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to read the joined rows");
    assert_eq!(rows[0].part(1).get_column("title"), rows[0].row().get_column("t1_title"));
    assert_eq!(
        rows[1].main::<Employee>().map(|v| v.id).ok(),
        Some(2),
        "Labels are matched ignoring case"
    );
    assert!(
        rows[1]
            .related::<Department>(0)
            .expect("Failed to decode the department")
            .is_none()
    );

    // Related entity without key
    let explicit = Repository::new(Arc::new(
        Configuration::builder()
            .dialect(dialect.clone())
            .mapper(ExplicitMapper)
            .build(),
    ));
    executor.clear();
    let error = explicit
        .select_join::<Employee, _>(
            &mut executor,
            &Relations::new().with::<Note>("department_id"),
            JoinType::Default,
            None,
            &[],
        )
        .try_collect::<Vec<_>>()
        .await
        .expect_err("A related entity without key cannot be joined");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::KeyMisconfiguration { .. })
    ));
    assert!(executor.queries().is_empty());
}
