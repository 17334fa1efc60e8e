use crate::{
    MockExecutor, Membership, Note, Order, Ticket, Token, affected, error_kind, repository, row,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use stencil::{
    Configuration, KeyKind, KeyValue, ManualClock, Repository, SnowflakeGenerator, SqlWriter,
    StencilError, Value, WorkerId,
};
use uuid::Uuid;

pub async fn guid_keys<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = repository(dialect);
    let mut executor = MockExecutor::affecting_one();
    let mut token = Token {
        id: Uuid::nil(),
        label: "first".into(),
    };
    let key = repository
        .insert(&mut executor, &mut token)
        .await
        .expect("Failed to insert a token");
    assert!(!token.id.is_nil(), "The guid must be generated");
    assert_eq!(key, KeyValue::Scalar(Value::Uuid(Some(token.id))));
    let insert = executor.last().expect("The insert was not executed");
    assert_eq!(insert.params.get("id"), Some(&Value::Uuid(Some(token.id))));

    let preset = Uuid::parse_str("5e915574-bb30-4430-98cf-c5854f61fbbd").unwrap();
    let mut token = Token {
        id: preset,
        label: "second".into(),
    };
    repository
        .insert(&mut executor, &mut token)
        .await
        .expect("Failed to insert a token");
    assert_eq!(token.id, preset, "A caller provided guid is kept");
    assert_eq!(executor.queries().len(), 2);
}

pub async fn assigned_keys<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let now = SnowflakeGenerator::DEFAULT_EPOCH + 1_000;
    let clock = Arc::new(ManualClock::new(now));
    let generator = Arc::new(
        SnowflakeGenerator::new(WorkerId::new(3, 4).unwrap()).with_clock(clock.clone()),
    );
    let repository = Repository::new(Arc::new(
        Configuration::builder()
            .dialect(dialect.clone())
            .id_generator(generator.clone())
            .build(),
    ));
    let expected = (1_000i64 << 22) | (((3 << 5) | 4) << 12);
    let mut executor = MockExecutor::affecting_one();

    let mut order = Order {
        amount: Decimal::new(1999, 2),
        ..Default::default()
    };
    let key = repository
        .insert(&mut executor, &mut order)
        .await
        .expect("Failed to insert an order");
    assert_eq!(order.id, Some(expected));
    assert_eq!(key, KeyValue::Scalar(Value::Int64(Some(expected))));
    let insert = executor.last().expect("The insert was not executed");
    assert_eq!(insert.params.get("id"), Some(&Value::Int64(Some(expected))));
    assert!(!insert.params.contains("created"), "Read only columns are not written");
    let parts = generator.decompose(expected);
    assert_eq!(parts.timestamp, now);
    assert_eq!(parts.worker, WorkerId::new(3, 4).unwrap());
    assert_eq!(parts.sequence, 0);

    let mut order = Order {
        id: Some(5),
        amount: Decimal::ONE,
        created: None,
    };
    repository
        .insert(&mut executor, &mut order)
        .await
        .expect("Failed to insert an order");
    assert_eq!(order.id, Some(5), "A caller provided key is kept");

    let mut ticket = Ticket {
        code: "  ".into(),
        title: "Broken login".into(),
    };
    repository
        .insert(&mut executor, &mut ticket)
        .await
        .expect("Failed to insert a ticket");
    assert_eq!(ticket.code, (expected + 1).to_string());
    let insert = executor.last().expect("The insert was not executed");
    assert_eq!(
        insert.params.get("code"),
        Some(&Value::Varchar(Some(ticket.code.clone())))
    );

    clock.advance(std::time::Duration::from_millis(1));
    assert_eq!(
        repository.next_id().expect("Failed to generate an id"),
        (expected + (1 << 22)).to_string()
    );
}

pub async fn composite_keys<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = repository(dialect);
    let mut executor = MockExecutor::affecting_one();
    let mut membership = Membership {
        user_id: 1,
        group_id: 2,
        role: "admin".into(),
    };
    let key = repository
        .insert(&mut executor, &mut membership)
        .await
        .expect("Failed to insert a membership");
    assert_eq!(
        key,
        KeyValue::composite([("user_id", 1i64), ("group_id", 2i64)])
    );
    assert_eq!(key.get("GROUP_ID"), Some(&Value::Int64(Some(2))));
    assert_eq!(key.as_scalar(), None);

    // Plain integer keys are never generated
    let mut membership = Membership {
        user_id: 0,
        group_id: 5,
        role: "guest".into(),
    };
    repository
        .insert(&mut executor, &mut membership)
        .await
        .expect("Failed to insert a membership");
    assert_eq!(membership.user_id, 0);
    assert_eq!(
        executor.last().and_then(|q| q.params.get("user_id")),
        Some(&Value::Int64(Some(0)))
    );

    let mut executor = MockExecutor::replaying(vec![
        row(
            &["user_id", "group_id", "role"],
            [
                Value::Int64(Some(1)),
                Value::Int64(Some(2)),
                Value::Varchar(Some("admin".into())),
            ],
        ),
        affected(0),
    ]);
    let found = repository
        .get::<Membership, _>(&mut executor, key.clone())
        .await
        .expect("Failed to get a membership");
    assert_eq!(found, Some(membership));
    let select = executor.last().expect("The select was not executed");
    assert_eq!(select.params.len(), 2);

    let error = repository
        .get::<Membership, _>(&mut executor, KeyValue::scalar(1i64))
        .await
        .expect_err("A scalar identifier cannot address a composite key");
    assert!(matches!(
        error_kind(&error),
        Some(StencilError::KeyMisconfiguration { .. })
    ));
}

pub async fn conventional_keys<D: SqlWriter + Clone + 'static>(dialect: &D) {
    let repository = repository(dialect);
    let schema = repository
        .config()
        .schema::<Note>()
        .expect("Failed to resolve the schema of Note");
    assert_eq!(
        schema.find_property("id").map(|p| p.key_kind),
        Some(KeyKind::Identity)
    );
    assert!(Arc::ptr_eq(
        &schema,
        &repository.config().schema::<Note>().unwrap()
    ));

    let mut executor = MockExecutor::replaying(vec![
        row(&["ID", "BODY"], [Value::Int32(Some(3)), Value::Varchar(Some("hello".into()))]),
        affected(0),
    ]);
    let note = repository
        .get::<Note, _>(&mut executor, KeyValue::scalar(3))
        .await
        .expect("Failed to get a note");
    assert_eq!(
        note,
        Some(Note {
            id: 3,
            body: "hello".into()
        })
    );

    // Note has no Default, every column is required
    let mut executor =
        MockExecutor::replaying(vec![row(&["id"], [Value::Int32(Some(3))]), affected(0)]);
    let error = repository
        .get::<Note, _>(&mut executor, KeyValue::scalar(3))
        .await
        .expect_err("A partial row cannot build a Note");
    assert!(error.to_string().contains("body"));
}
