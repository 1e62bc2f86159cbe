use todo_app::{
    auth::SignUpRequest,
    client::{
        AuthClient, AuthSession, ClientError, HttpTodoClient, RootScreen, RootView, SignInStep,
        TodoListView,
    },
    outputs::ClientOutputs,
    schema::TodoItem,
    test_helpers::{test_app, test_config},
};

async fn serve() -> (
    ClientOutputs,
    std::sync::Arc<todo_app::test_helpers::RecordingSmsSender>,
) {
    let (outputs, sms, _server) = serve_with(&[]).await;
    (outputs, sms)
}

// Serves the app on an ephemeral port and hands back the outputs file a client would load.
async fn serve_with(
    overrides: &[(&str, &str)],
) -> (
    ClientOutputs,
    std::sync::Arc<todo_app::test_helpers::RecordingSmsSender>,
    tokio::task::JoinHandle<()>,
) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let public_url = format!("http://{}", listener.local_addr().expect("local addr"));
    let mut settings = vec![("general.public_url", public_url.as_str())];
    settings.extend_from_slice(overrides);
    let (app, state, sms) = test_app(test_config(&settings)).await;
    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });

    let path = std::env::temp_dir()
        .join(format!("todo-client-{}", uuid::Uuid::new_v4()))
        .join("todo_outputs.json");
    ClientOutputs::from_config(&state.config)
        .write(&path)
        .expect("write outputs");
    let outputs = ClientOutputs::load(&path).expect("load outputs");
    let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
    (outputs, sms, server)
}

#[tokio::test]
async fn client_signs_in_with_sms_and_manages_todos() {
    let (outputs, sms) = serve().await;
    let auth = AuthClient::new(&outputs);
    let root = RootView::new(auth.clone());
    assert_eq!(root.render().await, RootScreen::SignIn);

    let step = auth
        .sign_up(&SignUpRequest {
            email: "alice@example.com".to_string(),
            password: "Password1".to_string(),
            phone_number: Some("+15555550100".to_string()),
        })
        .await
        .expect("sign up");
    assert_eq!(
        step,
        SignInStep::ConfirmSms {
            destination: "+*******0100".to_string()
        }
    );
    assert!(!auth.is_signed_in().await);

    let err = auth.confirm_sign_in("nope").await.expect_err("wrong code");
    assert!(matches!(err, ClientError::Api { status: 401, .. }));

    let code = sms.last_code().expect("code sent");
    auth.confirm_sign_in(&code).await.expect("confirm");
    assert_eq!(
        root.render().await,
        RootScreen::Todos {
            heading: "alice@example.com's Todos".to_string()
        }
    );

    let mut view = TodoListView::new(HttpTodoClient::new(&outputs, auth.clone()));
    view.fetch().await;
    assert!(view.items().is_empty());

    view.set_input("Buy milk");
    view.create().await;
    view.set_input("Buy milk");
    view.create().await;
    assert_eq!(view.items().len(), 2);
    assert_eq!(view.input(), "");

    let first = view.items()[0].id;
    view.delete(&first).await;
    assert_eq!(view.items().len(), 1);
    assert_ne!(view.items()[0].id, first);

    let mut reloaded = TodoListView::new(HttpTodoClient::new(&outputs, auth.clone()));
    reloaded.fetch().await;
    let ids = |items: &[TodoItem]| items.iter().map(|item| item.id).collect::<Vec<_>>();
    assert_eq!(ids(reloaded.items()), ids(view.items()));

    root.sign_out().await.expect("sign out");
    assert_eq!(root.render().await, RootScreen::SignIn);
    assert!(matches!(
        auth.access_token().await,
        Err(ClientError::NotSignedIn)
    ));
}

#[tokio::test]
async fn client_reports_api_errors() {
    let (outputs, _) = serve().await;
    let auth = AuthClient::new(&outputs);

    let err = auth
        .sign_in("ghost@example.com", "Password1")
        .await
        .expect_err("unknown user");
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected error: {other}"),
    }

    let step = auth
        .sign_up(&SignUpRequest {
            email: "bob@example.com".to_string(),
            password: "Password1".to_string(),
            phone_number: None,
        })
        .await
        .expect("sign up");
    assert_eq!(step, SignInStep::Done);

    let profile = auth.current_user().await.expect("current user");
    assert_eq!(profile.email, "bob@example.com");
}

#[tokio::test]
async fn sign_out_clears_the_session_when_the_server_is_gone() {
    // Short enough that the access token is already due for refresh.
    let (outputs, _, server) = serve_with(&[("auth.access_ttl_secs", "5")]).await;
    let http = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .expect("build http client");
    let auth = AuthClient::with_http(http, &outputs);
    auth.sign_up(&SignUpRequest {
        email: "carol@example.com".to_string(),
        password: "Password1".to_string(),
        phone_number: None,
    })
    .await
    .expect("sign up");
    assert!(auth.is_signed_in().await);

    server.abort();
    let _ = server.await;

    let err = auth.sign_out(false).await.expect_err("server is down");
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(!auth.is_signed_in().await);
}
