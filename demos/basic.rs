//! Minimal tessera example: template pages, a JSON endpoint and a custom 404.
//!
//! Run with:
//!   cargo run --example basic
//!
//! Try:
//!   curl http://localhost:5000/
//!   curl http://localhost:5000/user/jero
//!   curl http://localhost:5000/api/data
//!   curl -X POST http://localhost:5000/echo -d 'hello'
//!   curl http://localhost:5000/nope

use tessera::{App, Config, Context, Method, Params, Request, Response, Server, Templates};

#[tokio::main]
async fn main() -> Result<(), tessera::Error> {
    tracing_subscriber::fmt::init();

    let config = Config {
        template_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/demos/templates").into(),
        debug: true,
        ..Config::default()
    };
    let templates = Templates::from_dir(&config.template_dir);
    let home_templates = templates.clone();

    let app = App::new()
        .get("/", move |_: &Request, _: &Params| {
            let ctx = Context::new()
                .with("name", "Jero")
                .with("visitors", 42)
                .with("pages", vec!["about", "api/data"]);
            home_templates.render("index.html", &ctx)
        })?
        .get("/about", about)?
        .get("/user/<username>", move |req: &Request, p: &Params| {
            let ctx = Context::new()
                .with("username", p.get("username").unwrap_or_default())
                .with("admin", req.arg("admin") == Some("1"));
            templates.render("user.html", &ctx)
        })?
        .get("/api/data", |_: &Request, _: &Params| {
            Response::json(r#"{"status":"success","data":{"message":"Hello from tessera!"}}"#)
        })?
        .route("/echo", [Method::Post, Method::Put], echo)?
        .error_handler(404, not_found);

    Server::from_config(&config).serve(app).await
}

fn about(_: &Request, _: &Params) -> &'static str {
    "<html>\
       <head><title>About</title></head>\
       <body><h1>About Page</h1><a href=\"/\">Go Home</a></body>\
     </html>"
}

// Empty bodies are a handler failure, surfaced as a 500.
fn echo(req: &Request, _: &Params) -> Result<Response, String> {
    if req.body().is_empty() {
        return Err("nothing to echo".to_owned());
    }
    Ok(Response::text(req.body().to_owned()))
}

fn not_found() -> String {
    "<html>\
       <head><title>404 - Not Found</title></head>\
       <body><h1>Page Not Found</h1><a href=\"/\">Go Home</a></body>\
     </html>"
        .to_owned()
}
