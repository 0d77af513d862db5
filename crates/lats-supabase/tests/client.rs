//! `SupabaseClient` against a local fake PostgREST server.

use std::io::Read;
use std::sync::mpsc;
use std::thread;

use lats_config::SupabaseConfig;
use lats_supabase::{BackendError, SqlBackend, SupabaseClient};
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct Seen {
    method: String,
    url: String,
    apikey: Option<String>,
    authorization: Option<String>,
    profile: Option<String>,
    body: String,
}

/// Serve one canned response per request, reporting what was received.
fn serve(responses: Vec<(u16, &'static str)>) -> (String, mpsc::Receiver<Seen>) {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for (status, body) in responses {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let header = |name: &'static str| {
                request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv(name))
                    .map(|h| h.value.as_str().to_string())
            };
            let apikey = header("apikey");
            let authorization = header("Authorization");
            let profile = header("Accept-Profile").or_else(|| header("Content-Profile"));
            let mut received = String::new();
            request.as_reader().read_to_string(&mut received).unwrap();
            let _ = tx.send(Seen {
                method: request.method().to_string(),
                url: request.url().to_string(),
                apikey,
                authorization,
                profile,
                body: received,
            });
            let response = tiny_http::Response::from_string(body)
                .with_status_code(status)
                .with_header(
                    tiny_http::Header::from_bytes("Content-Type", "application/json").unwrap(),
                );
            let _ = request.respond(response);
        }
    });

    (format!("http://{addr}"), rx)
}

fn client(url: &str, config: SupabaseConfig) -> SupabaseClient {
    SupabaseClient::from_config(&SupabaseConfig {
        url: url.to_string(),
        ..config
    })
    .unwrap()
}

fn keys() -> SupabaseConfig {
    SupabaseConfig {
        anon_key: "anon-key".into(),
        service_role_key: "service-key".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn exec_sql_posts_to_rpc_with_both_auth_headers() {
    let (url, rx) = serve(vec![(204, "")]);
    let client = client(&url, keys());

    client
        .exec_sql("CREATE TABLE IF NOT EXISTS t (id int)")
        .await
        .unwrap();

    let seen = rx.recv().unwrap();
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.url, "/rest/v1/rpc/exec_sql");
    assert_eq!(seen.apikey.as_deref(), Some("service-key"));
    assert_eq!(seen.authorization.as_deref(), Some("Bearer service-key"));
    assert_eq!(seen.profile, None);
    let body: serde_json::Value = serde_json::from_str(&seen.body).unwrap();
    assert_eq!(
        body,
        serde_json::json!({ "sql": "CREATE TABLE IF NOT EXISTS t (id int)" })
    );
}

#[tokio::test]
async fn custom_function_and_parameter_names() {
    let (url, rx) = serve(vec![(200, "null")]);
    let client = client(
        &url,
        SupabaseConfig {
            exec_function: "admin.run_sql".into(),
            sql_param: "query".into(),
            ..keys()
        },
    );

    client.exec_sql("SELECT 1").await.unwrap();

    let seen = rx.recv().unwrap();
    assert_eq!(seen.url, "/rest/v1/rpc/run_sql");
    assert_eq!(seen.profile.as_deref(), Some("admin"));
    assert!(seen.body.contains(r#""query":"SELECT 1""#));
}

#[tokio::test]
async fn exec_sql_surfaces_postgres_error() {
    let (url, _rx) = serve(vec![(
        400,
        r#"{"code":"42P01","details":null,"hint":null,"message":"relation \"lats_sales\" does not exist"}"#,
    )]);
    let client = client(&url, keys());

    let err = client
        .exec_sql("ALTER TABLE lats_sales ADD COLUMN tax numeric")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.code(), Some("42P01"));
    assert!(err.is_missing_object());
    assert_eq!(
        err.summary(),
        "API error (400, 42P01): relation \"lats_sales\" does not exist"
    );
}

#[tokio::test]
async fn missing_rpc_is_recognized() {
    let (url, _rx) = serve(vec![(
        404,
        r#"{"code":"PGRST202","details":"Searched for the function public.exec_sql with parameter sql","hint":null,"message":"Could not find the function public.exec_sql(sql) in the schema cache"}"#,
    )]);
    let client = client(&url, keys());

    let err = client.exec_sql("SELECT 1").await.unwrap_err();

    assert!(err.is_missing_rpc(client.exec_function()));
}

#[tokio::test]
async fn select_builds_query_and_returns_rows() {
    let (url, rx) = serve(vec![(200, r#"[{"id":1,"name":"a"}]"#)]);
    let client = client(
        &url,
        SupabaseConfig {
            service_role_key: String::new(),
            ..keys()
        },
    );

    let rows = client.select("inventory.lats_brands", "id,name", 1).await.unwrap();

    assert_eq!(rows.len(), 1);
    let seen = rx.recv().unwrap();
    assert_eq!(seen.method, "GET");
    assert_eq!(seen.url, "/rest/v1/lats_brands?select=id%2Cname&limit=1");
    assert_eq!(seen.profile.as_deref(), Some("inventory"));
    assert_eq!(seen.apikey.as_deref(), Some("anon-key"));
}

#[tokio::test]
async fn select_missing_table() {
    let (url, _rx) = serve(vec![(
        404,
        r#"{"code":"PGRST205","details":null,"hint":null,"message":"Could not find the table 'public.nope' in the schema cache"}"#,
    )]);
    let client = client(&url, keys());

    let err = client.select("nope", "*", 1).await.unwrap_err();

    assert!(err.is_missing_object());
}

#[tokio::test]
async fn select_rejects_non_array_body() {
    let (url, _rx) = serve(vec![(200, r#"{"id":1}"#)]);
    let client = client(&url, keys());

    let err = client.select("t", "*", 1).await.unwrap_err();

    assert!(matches!(err, BackendError::Parse(_)));
}

#[tokio::test]
async fn select_refuses_invalid_table_name_without_a_request() {
    let (url, rx) = serve(vec![]);
    let client = client(&url, keys());

    let err = client.select("t; drop table x", "*", 1).await.unwrap_err();

    assert!(matches!(err, BackendError::InvalidRequest(_)));
    assert!(rx.try_recv().is_err());
}
