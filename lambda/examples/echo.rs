use std::sync::{Arc, Mutex};

use lambda_adapter::{
    handler_fn, logging, Adapter, AdapterError, CanonicalRequest, CanonicalResponse, Context,
    Err, ErrorReport,
};
use lambda_runtime::{service_fn, Diagnostic, Error, LambdaEvent};
use serde_json::Value;

// Deploy behind any mix of REST API, HTTP API or Lambda@Edge triggers.
fn echo(req: CanonicalRequest) -> Result<CanonicalResponse, Err> {
    let mut res = CanonicalResponse::builder()
        .header("Content-Type", "text/plain")
        .header("X-Base-Url", req.base_url());
    let body = match req.query_string() {
        "" => format!("{} {}", req.method(), req.path()),
        query => format!("{} {}?{}", req.method(), req.path(), query),
    };
    res = res.body(body);
    Ok(res.build()?)
}

// The runtime reports failures as `{errorType, errorMessage}`; the kind names the adapter
// failure, not the Rust type.
fn diagnostic(err: &AdapterError) -> Diagnostic {
    let report = ErrorReport::from(err);
    Diagnostic {
        error_type: report.name,
        error_message: report.err,
    }
}

fn internal(message: impl ToString) -> Diagnostic {
    Diagnostic {
        error_type: String::from("InternalError"),
        error_message: message.to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let adapter = Adapter::from_env(handler_fn(echo))?;
    logging::init(adapter.config());
    let adapter = Arc::new(Mutex::new(adapter));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let adapter = Arc::clone(&adapter);
        async move {
            let ctx = Context {
                request_id: event.context.request_id.clone(),
                invoked_function_arn: Some(event.context.invoked_function_arn.clone()),
                xray_trace_id: event.context.xray_trace_id.clone(),
                deadline_ms: Some(event.context.deadline),
            };
            let mut adapter = adapter
                .lock()
                .map_err(|_| internal("adapter lock poisoned"))?;
            let reply = adapter
                .handle(event.payload, &ctx)
                .map_err(|e| diagnostic(&e))?;
            reply.to_value().map_err(internal)
        }
    }))
    .await
}
