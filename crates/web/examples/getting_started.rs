use micro_handler::{handler_fn, middleware_fn, transform_fn, Context, Handler, PipelineError};
use serde_json::{json, Value};

async fn authenticate(_input: Value, _ctx: Context) -> Result<Context, PipelineError> {
    // a real middleware would check a token here
    Ok(Context::with_entry("user", "ada"))
}

async fn create_note(input: Value, ctx: Context) -> Result<Value, PipelineError> {
    let text = input["body"]["text"].as_str().unwrap_or_default();
    Ok(json!({"note": text, "author": ctx.get("user").cloned()}))
}

async fn envelope(output: Value, _ctx: Context) -> Result<Value, PipelineError> {
    Ok(json!({"ok": true, "data": output}))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let handler = Handler::new()
        .input(json!({
            "body": {"text": "required|string|min:1"},
            "query": {"draft": "in:true,false"}
        }))
        .middleware(middleware_fn(authenticate))
        .handle(handler_fn(create_note))
        .transform(transform_fn(envelope));

    let raw = json!({
        "body": {"text": "remember the milk"},
        "query": {"draft": "false"},
        "params": {"ignored": "not in the schema"}
    });

    match handler.execute(raw).await {
        Ok(result) => println!("{result:#}"),
        Err(err) => eprintln!("failed: {err}"),
    }
}
