pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_CONTEXT_LIMIT: u64 = 128_000;

/// HTTP request timeout for model calls, in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 300;
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 30;

pub const CONNECTION_TEST_PROMPT: &str = "Say 'ok' if you can read this.";
pub const CONNECTION_TEST_MAX_TOKENS: u32 = 10;
