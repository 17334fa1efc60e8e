use crate::{MockExecutor, Membership, Token, affected, error_kind, silent_logs};
use std::{collections::HashSet, sync::Arc};
use stencil::{Configuration, Repository, RowsAffected, SqlWriter, StencilError};
use uuid::Uuid;

pub async fn batch<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = crate::repository(dialect);
    let prefix = dialect.parameter_prefix();
    let mut executor = MockExecutor::new(|_| Ok(vec![affected(3)]));
    let mut tokens = (0..3)
        .map(|i| Token {
            id: Uuid::nil(),
            label: format!("token {i}"),
        })
        .collect::<Vec<_>>();
    let result = repository
        .insert_many(&mut executor, &mut tokens, false)
        .await
        .expect("Failed to insert the tokens");
    assert_eq!(result.rows_affected, 3);
    assert_eq!(executor.queries().len(), 1, "A batch is a single statement");
    let ids = tokens.iter().map(|t| t.id).collect::<HashSet<_>>();
    assert_eq!(ids.len(), 3);
    assert!(!ids.contains(&Uuid::nil()));
    let query = executor.last().expect("The batch was not executed");
    assert_eq!(query.params.len(), 3 * 2, "One parameter per row and column");
    for (i, token) in tokens.iter().enumerate() {
        assert!(query.sql.contains(&format!("{prefix}id_{i}")));
        assert!(query.sql.contains(&format!("{prefix}label_{i}")));
        assert_eq!(
            query.params.get(&format!("id_{i}")),
            Some(&stencil::Value::Uuid(Some(token.id)))
        );
    }
    assert!(!query.sql.contains(&format!("{prefix}id_3")));

    // Nothing to insert
    executor.clear();
    let result = repository
        .insert_many::<Token, _>(&mut executor, &mut [], false)
        .await
        .expect("Failed to insert nothing");
    assert_eq!(result, RowsAffected::default());
    assert!(executor.queries().is_empty());

    // Upsert
    let mut memberships = (1..=2)
        .map(|i| Membership {
            user_id: i,
            group_id: 10,
            role: "reader".into(),
        })
        .collect::<Vec<_>>();
    let mut executor = MockExecutor::new(|_| Ok(vec![affected(2)]));
    let mut plain = String::new();
    match repository
        .insert_many(&mut executor, &mut memberships, true)
        .await
    {
        Ok(result) => {
            assert_eq!(result.rows_affected, 2);
            let upsert = executor.last_sql().to_owned();
            repository
                .insert_many(&mut executor, &mut memberships, false)
                .await
                .expect("Failed to insert the memberships");
            plain.push_str(executor.last_sql());
            assert!(upsert.starts_with(plain.as_str()));
            assert!(upsert.len() > plain.len());
            assert!(upsert[plain.len()..].contains("role"));
        }
        Err(error) => {
            assert!(matches!(
                error_kind(&error),
                Some(StencilError::Unsupported(..))
            ));
            assert!(executor.queries().is_empty());
        }
    }

    // Large batches are only reported
    let repository = Repository::new(Arc::new(
        Configuration::builder()
            .dialect(dialect.clone())
            .batch_warning_threshold(16)
            .build(),
    ));
    let result;
    silent_logs! {
        result = repository
            .insert_many(&mut executor, &mut tokens, false)
            .await;
    }
    assert!(result.is_ok());
}
