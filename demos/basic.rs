//! Minimal kite example: HTML, text, form-to-JSON, and a guarded group.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:9999/
//!   curl http://localhost:9999/hello/kite
//!   curl -X POST http://localhost:9999/login -d 'username=alice&password=hunter2'
//!   curl http://localhost:9999/assets/css/app.css
//!   curl http://localhost:9999/admin/stats
//!   curl -H 'authorization: letmein' http://localhost:9999/admin/stats
//!
//! `KITE_ADDR` overrides the bind address (default `127.0.0.1:9999`).

use kite::{Context, Engine, middleware};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Login {
    username: Option<String>,
    password: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), kite::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let addr = std::env::var("KITE_ADDR").unwrap_or_else(|_| "127.0.0.1:9999".to_owned());

    let mut app = Engine::new();
    app.middleware(middleware::logger());

    app.get("/", |c| c.html(200, "<h1>Hello Kite</h1>"))?
        .get("/hello", |c| c.string(200, "hello\n"))?
        .get("/hello/:name", hello)?
        .get("/assets/*filepath", |c| {
            let body = format!("asset {}\n", c.param("filepath").unwrap_or_default());
            c.string(200, body);
        })?
        .route(kite::Method::Get, "/login", login)?
        .post("/login", login)?;

    let mut admin = app.group("/admin");
    admin.middleware(require_auth);
    admin.get("/stats", |c| {
        c.json(200, &serde_json::json!({ "uptime": "forever" }));
    })?;

    app.run(&addr).await
}

// GET /hello/:name
fn hello(c: &mut Context) {
    let body = format!("hello {}, you're at {}\n", c.param("name").unwrap_or_default(), c.path());
    c.string(200, body);
}

// GET|POST /login: echoes the form fields back as JSON.
fn login(c: &mut Context) {
    let login = Login {
        username: c.post_form("username"),
        password: c.post_form("password"),
    };
    c.json(200, &login);
}

// Rejects /admin requests without an authorization header.
fn require_auth(c: &mut Context) {
    if c.header("authorization").is_none() {
        c.fail(401, "unauthorized");
    }
}
