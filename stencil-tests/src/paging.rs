use crate::{MockExecutor, Person, affected, error_kind, repository, row, select::person_row};
use stencil::{Predicate, Sort, SqlWriter, StencilError, Value, stream::TryStreamExt};

fn people() -> Vec<Person> {
    (1..=25)
        .map(|i| Person {
            id: i,
            name: format!("Person {i:02}"),
            age: 20 + i as i32,
            nickname: None,
        })
        .collect()
}

pub async fn paging<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = repository(dialect);
    let people = people();
    let page = people[10..20].to_vec();
    let total = row(&["TOTAL"], [Value::Int64(Some(people.len() as i64))]);
    let multiple_statements = dialect.supports_multiple_statements();
    let mut executor = MockExecutor::new({
        let page = page.clone();
        move |query| {
            let rows = page.iter().map(person_row).chain([affected(0)]);
            Ok(if multiple_statements {
                rows.chain([total.clone(), affected(0)]).collect()
            } else if query.sql.starts_with("SELECT COUNT(") {
                vec![total.clone(), affected(0)]
            } else {
                rows.collect()
            })
        }
    });

    // Page 2 of 25 rows, 10 per page
    let result = repository
        .get_page::<Person, _>(&mut executor, None, &[Sort::asc("id")], 2, 10)
        .await
        .expect("Failed to read the second page");
    assert_eq!(result.items, page);
    assert_eq!(result.total, 25);
    if multiple_statements {
        assert_eq!(executor.queries().len(), 1);
    } else {
        assert_eq!(executor.queries().len(), 2, "The count is a separate query");
        assert!(executor.last_sql().starts_with("SELECT COUNT(*)"));
    }
    let paged = &executor.queries()[0];
    assert!(paged.sql.contains("ORDER BY"));
    assert!(
        paged.params.iter().any(|p| p.value == Value::UInt64(Some(10))),
        "The offset or bound of the second page is bound as a parameter"
    );

    // Filtered page
    executor.clear();
    let filter = Predicate::ge("age", 30);
    repository
        .get_page::<Person, _>(&mut executor, Some(&filter), &[Sort::desc("age")], 1, 10)
        .await
        .expect("Failed to read a filtered page");
    for query in executor.queries() {
        assert_eq!(query.params.get("age_1"), Some(&Value::Int32(Some(30))));
    }

    // Sort is mandatory
    executor.clear();
    let error = repository
        .get_page::<Person, _>(&mut executor, None, &[], 1, 10)
        .await
        .expect_err("A page without sort must be rejected");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::MissingInput(..))
    ));
    assert!(executor.queries().is_empty());

    // Missing total
    let mut executor = MockExecutor::new({
        let page = page.clone();
        move |query| {
            Ok(if query.sql.starts_with("SELECT COUNT(") {
                vec![affected(0)]
            } else {
                page.iter().map(person_row).chain([affected(0)]).collect()
            })
        }
    });
    let error = repository
        .get_page::<Person, _>(&mut executor, None, &[Sort::asc("id")], 1, 10)
        .await
        .expect_err("A page without total must fail");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::InvalidState(..))
    ));

    // Window
    let mut executor =
        MockExecutor::replaying(page[..3].iter().map(person_row).chain([affected(0)]).collect());
    let found = repository
        .get_set::<Person, _>(&mut executor, None, &[Sort::asc("id")], 10, 3)
        .try_collect::<Vec<_>>()
        .await
        .expect("Failed to read a window");
    assert_eq!(found, page[..3]);
    assert_eq!(executor.queries().len(), 1);
    let error = repository
        .get_set::<Person, _>(&mut executor, None, &[], 0, 3)
        .try_collect::<Vec<_>>()
        .await
        .expect_err("A window without sort must be rejected");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::MissingInput(..))
    ));
}
