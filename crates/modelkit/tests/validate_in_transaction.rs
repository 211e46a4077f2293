use std::sync::{Arc, Mutex};

use asupersync::runtime::RuntimeBuilder;
use modelkit::prelude::*;

/// In-memory `users` table with transaction bookkeeping.
#[derive(Debug, Default)]
struct MemoryAdapter {
    committed: Mutex<Vec<Row>>,
    pending: Mutex<Vec<Row>>,
    log: Mutex<Vec<String>>,
}

impl MemoryAdapter {
    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn stage(&self, row: Row) {
        self.pending.lock().unwrap().push(row);
    }

    fn committed_emails(&self) -> Vec<String> {
        self.committed
            .lock()
            .unwrap()
            .iter()
            .filter_map(|r| r.get("email").and_then(Value::as_str).map(str::to_string))
            .collect()
    }
}

impl Adapter for MemoryAdapter {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn supports(&self, capability: Capability) -> bool {
        capability == Capability::Transactions
    }

    fn query<'a>(
        &'a self,
        _cx: &'a Cx,
        command: &'a str,
        params: &'a [Value],
    ) -> BoxFuture<'a, Outcome<QueryResult, Error>> {
        self.log.lock().unwrap().push(command.to_string());
        // Lookups are `... WHERE "email" = $1 ...`; match on the first parameter.
        let wanted = params.first().cloned();
        let rows: Vec<Row> = self
            .committed
            .lock()
            .unwrap()
            .iter()
            .chain(self.pending.lock().unwrap().iter())
            .filter(|row| wanted.as_ref().is_none_or(|w| row.get("email") == Some(w)))
            .cloned()
            .collect();
        Box::pin(async move { Outcome::Ok(QueryResult::from_rows(rows)) })
    }

    fn begin_transaction<'a>(
        &'a self,
        _cx: &'a Cx,
        _isolation: Option<IsolationLevel>,
    ) -> BoxFuture<'a, Outcome<(), Error>> {
        self.log.lock().unwrap().push("BEGIN".to_string());
        Box::pin(async { Outcome::Ok(()) })
    }

    fn commit<'a>(&'a self, _cx: &'a Cx) -> BoxFuture<'a, Outcome<(), Error>> {
        self.log.lock().unwrap().push("COMMIT".to_string());
        let staged: Vec<Row> = self.pending.lock().unwrap().drain(..).collect();
        self.committed.lock().unwrap().extend(staged);
        Box::pin(async { Outcome::Ok(()) })
    }

    fn rollback<'a>(&'a self, _cx: &'a Cx) -> BoxFuture<'a, Outcome<(), Error>> {
        self.log.lock().unwrap().push("ROLLBACK".to_string());
        self.pending.lock().unwrap().clear();
        Box::pin(async { Outcome::Ok(()) })
    }
}

fn user_rules(slot: &ConnectionSlot) -> RuleMap {
    RuleMap::new()
        .rule("name", Required::new())
        .rule("name", MinLength::new(3))
        .rule("email", Required::new())
        .rule("email", Email::new())
        .rule("email", Unique::new("users", "email").connection(slot.clone()))
}

async fn register(
    cx: &Cx,
    conn: &Connection,
    adapter: &Arc<MemoryAdapter>,
    rules: &RuleMap,
    user: DynamicModel,
) -> Outcome<(), Error> {
    Transaction::run(cx, conn, |_tx| async move {
        match Validator::new().validate(cx, &user, rules).await {
            Outcome::Ok(()) => {
                adapter.stage(user.to_row());
                Outcome::Ok(())
            }
            other => other,
        }
    })
    .await
}

#[test]
fn valid_user_is_committed() {
    let rt = RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime");
    let cx = Cx::for_testing();

    let adapter = Arc::new(MemoryAdapter::default());
    let conn = Connection::from_adapter(adapter.clone());
    let slot = ConnectionSlot::with(conn.clone());
    let rules = user_rules(&slot);

    rt.block_on(async {
        match conn.connect(&cx).await {
            Outcome::Ok(()) => {}
            _ => panic!("connect failed"),
        }
        let alice = DynamicModel::new("users")
            .with("name", "Alice")
            .with("email", "alice@example.com");
        match register(&cx, &conn, &adapter, &rules, alice).await {
            Outcome::Ok(()) => {}
            Outcome::Err(e) => panic!("unexpected error: {e}"),
            _ => panic!("register did not complete"),
        }
    });

    assert_eq!(adapter.committed_emails(), vec!["alice@example.com"]);
    assert_eq!(
        adapter.log(),
        vec![
            "BEGIN",
            "SELECT * FROM \"users\" WHERE \"email\" = $1 LIMIT 1",
            "COMMIT"
        ]
    );
}

#[test]
fn duplicate_and_malformed_users_are_rolled_back() {
    let rt = RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime");
    let cx = Cx::for_testing();

    let adapter = Arc::new(MemoryAdapter::default());
    let conn = Connection::from_adapter(adapter.clone());
    conn.mark_connected(true);
    let slot = ConnectionSlot::with(conn.clone());
    let rules = user_rules(&slot);

    rt.block_on(async {
        let alice = DynamicModel::new("users")
            .with("name", "Alice")
            .with("email", "alice@example.com");
        assert!(matches!(
            register(&cx, &conn, &adapter, &rules, alice).await,
            Outcome::Ok(())
        ));

        let impostor = DynamicModel::new("users")
            .with("name", "Al")
            .with("email", "alice@example.com");
        match register(&cx, &conn, &adapter, &rules, impostor).await {
            Outcome::Err(Error::Validation(err)) => {
                assert_eq!(
                    err.field_errors("name"),
                    ["name must be at least 3 characters".to_string()]
                );
                assert_eq!(err.field_errors("email"), ["email must be unique".to_string()]);
            }
            _ => panic!("expected validation error"),
        }

        let nobody = DynamicModel::new("users").with("name", "").with("email", "bad");
        match register(&cx, &conn, &adapter, &rules, nobody).await {
            Outcome::Err(Error::Validation(err)) => {
                assert_eq!(err.field_errors("name"), ["name is required".to_string()]);
                assert_eq!(
                    err.field_errors("email"),
                    ["email must be a valid email".to_string()]
                );
                assert_eq!(err.message_count(), 2);
            }
            _ => panic!("expected validation error"),
        }
    });

    assert_eq!(adapter.committed_emails(), vec!["alice@example.com"]);
    let log = adapter.log();
    assert_eq!(log.iter().filter(|l| *l == "COMMIT").count(), 1);
    assert_eq!(log.iter().filter(|l| *l == "ROLLBACK").count(), 2);
}

#[test]
fn validation_without_a_database_fails_closed() {
    let rt = RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime");
    let cx = Cx::for_testing();

    let slot = ConnectionSlot::new();
    let rules = user_rules(&slot);
    let user = DynamicModel::new("users")
        .with("name", "Alice")
        .with("email", "alice@example.com");

    rt.block_on(async {
        match Validator::new().validate(&cx, &user, &rules).await {
            Outcome::Err(e) if e.is_validation() => {
                let err = e.as_validation().expect("validation error");
                assert!(!err.has_error("name"));
                assert_eq!(
                    err.field_errors("email"),
                    ["Unable to verify that email is unique: no database connection".to_string()]
                );
            }
            _ => panic!("expected validation error"),
        }
    });
}
