use bytes::Bytes;
use http::Request;
use micro_handler::{handler_fn, Context, Handler, PipelineError};
use micro_handler_web::{HttpAdapter, PathParams};
use serde_json::{json, Value};

async fn get_user(input: Value, _ctx: Context) -> Result<Value, PipelineError> {
    let id = input["params"]["id"].as_str().unwrap_or("0");
    // the envelope shape takes control of status, headers and body
    Ok(json!({
        "status": 201,
        "body": {"id": id},
        "headers": {"x-user-id": id}
    }))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let handler = Handler::new()
        .input(json!({"params": {"id": "required|string"}}))
        .handle(handler_fn(get_user));
    let adapter = HttpAdapter::new(handler);

    // the surrounding router would plant the matched path parameters
    let mut params = PathParams::new();
    params.insert("id", "7");

    let request = Request::builder()
        .method("GET")
        .uri("/users/7")
        .extension(params)
        .body(Bytes::new())
        .unwrap();

    match adapter.call(request).await {
        Ok(response) => {
            println!("status: {}", response.status());
            println!("x-user-id: {:?}", response.headers().get("x-user-id"));
            println!("body: {}", String::from_utf8_lossy(response.body()));
        }
        Err(err) => eprintln!("failed: {err}"),
    }
}
