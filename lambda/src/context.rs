/// Per-invocation metadata from the Lambda runtime. The adapter only uses it for logging.
///
/// Hosts fill it from whatever runtime client they use; `lambda_runtime::Context`
/// carries every field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// The AWS request ID for this invocation.
    pub request_id: String,
    /// ARN of the function, version or alias that was invoked.
    pub invoked_function_arn: Option<String>,
    /// The X-Ray tracing header.
    pub xray_trace_id: Option<String>,
    /// Invocation deadline in milliseconds since the Unix epoch.
    pub deadline_ms: Option<u64>,
}

impl Context {
    /// A context carrying only a request ID.
    pub fn new(request_id: impl Into<String>) -> Self {
        Context {
            request_id: request_id.into(),
            ..Context::default()
        }
    }
}
