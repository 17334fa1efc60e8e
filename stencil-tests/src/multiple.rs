use crate::{MockExecutor, Person, Token, affected, error_kind, row, select::person_row};
use stencil::{MultipleQuery, Predicate, Result, Sort, SqlWriter, StencilError, Value};
use uuid::Uuid;

pub async fn multiple<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = crate::repository(dialect);
    let person = Person {
        id: 1,
        name: "Frank".into(),
        age: 38,
        nickname: None,
    };
    let token_id = Uuid::parse_str("1f0c2d9e-6a8b-4c1e-9f3a-2b7d5e4c8a10").unwrap();
    let token = row(
        &["id", "label"],
        [
            Value::Uuid(Some(token_id)),
            Value::Varchar(Some("api".into())),
        ],
    );
    let multiple_statements = dialect.supports_multiple_statements();
    let mut executor = MockExecutor::new({
        let person = person_row(&person);
        move |query| {
            let people = vec![person.clone(), affected(0)];
            let tokens = vec![token.clone(), token.clone(), affected(0)];
            Ok(if multiple_statements {
                people.into_iter().chain(tokens).collect()
            } else if query.sql.contains("people") {
                people
            } else {
                tokens
            })
        }
    });
    let query = MultipleQuery::new()
        .add::<Person>(Some(Predicate::eq("name", "Frank")), vec![])
        .add::<Token>(None, vec![Sort::asc("label")]);
    assert_eq!(query.len(), 2);
    let mut reader = repository
        .get_multiple(&mut executor, &query)
        .await
        .expect("Failed to run the multiple query");
    if multiple_statements {
        assert_eq!(executor.queries().len(), 1);
        assert_eq!(executor.queries()[0].params.len(), 1);
    } else {
        assert_eq!(executor.queries().len(), 2);
    }
    assert_eq!(reader.remaining(), 2);

    // Out of order
    let error = reader
        .read::<Token>()
        .err()
        .expect("The first result set holds people");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::InvalidState(..))
    ));
    assert_eq!(reader.remaining(), 2, "A failed read consumes nothing");

    let people = reader
        .read::<Person>()
        .expect("Failed to read the people")
        .collect::<Result<Vec<_>>>()
        .expect("Failed to decode the people");
    assert_eq!(people, [person]);
    let tokens = reader
        .read::<Token>()
        .expect("Failed to read the tokens")
        .collect::<Result<Vec<_>>>()
        .expect("Failed to decode the tokens");
    assert_eq!(tokens.len(), 2);
    assert!(tokens.iter().all(|t| t.id == token_id));
    assert_eq!(reader.remaining(), 0);
    assert!(reader.read::<Person>().is_err());

    // Missing result set
    let mut executor = MockExecutor::replaying(vec![affected(0)]);
    if multiple_statements {
        let error = repository
            .get_multiple(&mut executor, &query)
            .await
            .err()
            .expect("A missing result set must be reported");
        assert!(matches!(
            error_kind(&error),
            Some(StencilError::InvalidState(..))
        ));
    }

    // Nothing to run
    let reader = repository
        .get_multiple(&mut executor, &MultipleQuery::new())
        .await
        .expect("Failed to run an empty multiple query");
    assert_eq!(reader.remaining(), 0);
}
