use contact_book::capabilities::{DatabaseError, DatabaseOperation, DatabaseOutput};
use contact_book::list::ListView;
use contact_book::view::Screen;
use contact_book::{ClientConfig, Effect, Event, Model, ToastKind, MAX_QUEUED_TOASTS};
use crux_core::testing::AppTester;
use crux_core::Request;

type Tester = AppTester<contact_book::App, Effect>;

fn database_requests(effects: Vec<Effect>) -> Vec<Request<DatabaseOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Database(request) => Some(request),
            _ => None,
        })
        .collect()
}

/// Starts a session and returns the pending subscription request.
fn start(app: &Tester, model: &mut Model) -> Request<DatabaseOperation> {
    let update = app.update(Event::SessionStarted(ClientConfig::default()), model);
    assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));

    let mut requests = database_requests(update.effects);
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

fn deliver(app: &Tester, model: &mut Model, request: &mut Request<DatabaseOperation>, json: &str) {
    let update = app
        .resolve(request, Ok(DatabaseOutput::Value(json.as_bytes().to_vec())))
        .expect("subscription accepts values");
    for event in update.events {
        app.update(event, model);
    }
}

const TWO_CONTACTS: &str = r#"{
    "k1": {"name": "A", "email": "a@x.com", "phoneNumber": "1", "address": "", "picture": null, "star": false},
    "k2": {"name": "B", "email": "b@x.com", "phoneNumber": "2", "address": "", "picture": null, "star": true}
}"#;

#[test]
fn test_session_start_subscribes_and_shows_loading() {
    let app = Tester::default();
    let mut model = Model::default();

    let request = start(&app, &mut model);
    match &request.operation {
        DatabaseOperation::Subscribe { path, .. } => assert_eq!(path.to_string(), "contacts"),
        other => panic!("expected subscribe, got {other:?}"),
    }

    assert!(model.store.state().is_loading);
    let view = app.view(&model);
    assert_eq!(view.screen, Screen::ContactList(ListView::Loading));
    assert_eq!(view.path, "/");
}

#[test]
fn test_snapshot_renders_two_rows() {
    let app = Tester::default();
    let mut model = Model::default();
    let mut request = start(&app, &mut model);

    deliver(&app, &mut model, &mut request, TWO_CONTACTS);

    assert!(!model.store.state().is_loading);
    let Screen::ContactList(ListView::Rows(rows)) = app.view(&model).screen else {
        panic!("expected rows");
    };
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].key.as_str(), "k1");
    assert_eq!(rows[0].name, "A");
    assert_eq!(rows[1].key.as_str(), "k2");
    assert!(rows[1].star);
}

#[test]
fn test_snapshots_replace_collection() {
    let app = Tester::default();
    let mut model = Model::default();
    let mut request = start(&app, &mut model);

    deliver(&app, &mut model, &mut request, TWO_CONTACTS);
    deliver(&app, &mut model, &mut request, r#"{"k3": {"name": "C"}}"#);

    let contacts = &model.store.state().contacts;
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts.keys().next().map(|k| k.as_str()), Some("k3"));

    deliver(&app, &mut model, &mut request, "null");
    assert_eq!(app.view(&model).screen, Screen::ContactList(ListView::Empty));
}

#[test]
fn test_array_snapshot_keys_rows_by_index() {
    let app = Tester::default();
    let mut model = Model::default();
    let mut request = start(&app, &mut model);

    deliver(&app, &mut model, &mut request, TWO_CONTACTS);
    deliver(
        &app,
        &mut model,
        &mut request,
        r#"[{"name": "Zero"}, {"name": "One"}]"#,
    );

    let Screen::ContactList(ListView::Rows(rows)) = app.view(&model).screen else {
        panic!("expected rows");
    };
    let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    assert_eq!(keys, ["0", "1"]);
    assert_eq!(rows[1].name, "One");
    assert!(model.active_toast().is_none());
}

#[test]
fn test_repeated_subscription_errors_keep_toast_queue_bounded() {
    let app = Tester::default();
    let mut model = Model::default();
    let mut request = start(&app, &mut model);

    for attempt in 0..1_000 {
        let update = app
            .resolve(
                &mut request,
                Err(DatabaseError::Disconnected {
                    message: format!("socket closed ({attempt})"),
                }),
            )
            .expect("subscription accepts errors");
        for event in update.events {
            app.update(event, &mut model);
        }
    }

    assert!(model.toasts.len() <= MAX_QUEUED_TOASTS);
    assert_eq!(app.view(&model).pending_toasts, 1);
    assert_eq!(model.active_toast().map(|t| t.kind), Some(ToastKind::Error));
}

#[test]
fn test_subscription_error_clears_loading_and_toasts() {
    let app = Tester::default();
    let mut model = Model::default();
    let mut request = start(&app, &mut model);

    let update = app
        .resolve(
            &mut request,
            Err(DatabaseError::PermissionDenied {
                path: "contacts".into(),
            }),
        )
        .expect("subscription accepts errors");
    for event in update.events {
        app.update(event, &mut model);
    }

    assert!(!model.store.state().is_loading);
    let toast = app.view(&model).toast.expect("error toast");
    assert_eq!(toast.kind, ToastKind::Error);
}

#[test]
fn test_second_start_does_not_resubscribe() {
    let app = Tester::default();
    let mut model = Model::default();
    let _request = start(&app, &mut model);

    let update = app.update(Event::SessionStarted(ClientConfig::default()), &mut model);
    assert!(database_requests(update.effects).is_empty());
}

#[test]
fn test_session_end_unsubscribes_and_ignores_late_snapshots() {
    let app = Tester::default();
    let mut model = Model::default();
    let mut request = start(&app, &mut model);

    let subscription = match &request.operation {
        DatabaseOperation::Subscribe { id, .. } => id.clone(),
        other => panic!("expected subscribe, got {other:?}"),
    };

    let update = app.update(Event::SessionEnded, &mut model);
    let requests = database_requests(update.effects);
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].operation,
        DatabaseOperation::Unsubscribe { id: subscription }
    );
    assert!(model.subscription.is_none());

    deliver(&app, &mut model, &mut request, TWO_CONTACTS);
    assert!(model.store.state().contacts.is_empty());
}

#[test]
fn test_invalid_config_keeps_defaults() {
    let app = Tester::default();
    let mut model = Model::default();

    let config = ClientConfig {
        contacts_path: "contacts/a.b".into(),
        ..ClientConfig::default()
    };
    let update = app.update(Event::SessionStarted(config), &mut model);

    assert_eq!(model.config, ClientConfig::default());
    assert_eq!(model.active_toast().map(|t| t.kind), Some(ToastKind::Error));
    let requests = database_requests(update.effects);
    assert!(matches!(
        &requests[0].operation,
        DatabaseOperation::Subscribe { path, .. } if path.to_string() == "contacts"
    ));
}

#[test]
fn test_unknown_route_shows_not_found() {
    let app = Tester::default();
    let mut model = Model::default();

    app.update(
        Event::Navigate {
            path: "/nowhere".into(),
        },
        &mut model,
    );

    assert_eq!(
        app.view(&model).screen,
        Screen::NotFound {
            path: "/nowhere".into()
        }
    );
}
