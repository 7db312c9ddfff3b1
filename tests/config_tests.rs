use std::env;
use std::time::Duration;
use textbook_scanner::LLMProviderType;
use textbook_scanner::config::Config;

const VARS: &[&str] = &[
    "LLM_PROVIDER",
    "LLM_API_KEY",
    "GEMINI_API_KEY",
    "API_KEY",
    "LLM_BASE_URL",
    "LLM_MODEL",
    "LLM_TIMEOUT_SECS",
    "HOST",
    "PORT",
    "MAX_UPLOAD_BYTES",
    "RUST_LOG",
    "LOG_FILE_ENABLED",
    "LOG_CONSOLE_ENABLED",
    "LOG_DIRECTORY",
];

fn clear_vars() {
    for var in VARS {
        // SAFETY: this is the only test in this binary touching the environment.
        unsafe { env::remove_var(var) };
    }
}

fn set_var(key: &str, value: &str) {
    // SAFETY: see `clear_vars`.
    unsafe { env::set_var(key, value) };
}

#[test]
fn test_config_from_env() {
    // Defaults
    clear_vars();
    let config = Config::from_env().unwrap();
    assert_eq!(config.llm.provider, LLMProviderType::Gemini);
    assert_eq!(config.llm.api_key, "your-api-key");
    assert_eq!(config.llm.timeout(), Duration::from_secs(120));
    assert_eq!(config.server.address(), "0.0.0.0:3000");
    assert_eq!(config.server.max_upload_bytes, 10 * 1024 * 1024);
    assert_eq!(config.logging.level, "info,textbook_scanner=debug");
    assert!(config.validate().is_ok());

    // Key fallback chain
    set_var("API_KEY", "generic-key");
    assert_eq!(Config::from_env().unwrap().llm.api_key, "generic-key");
    set_var("GEMINI_API_KEY", "gemini-key");
    assert_eq!(Config::from_env().unwrap().llm.api_key, "gemini-key");
    set_var("LLM_API_KEY", "primary-key");
    assert_eq!(Config::from_env().unwrap().llm.api_key, "primary-key");

    // Explicit values
    set_var("LLM_PROVIDER", "OpenAI");
    set_var("LLM_MODEL", "gpt-4o-mini");
    set_var("LLM_BASE_URL", "http://localhost:8080/v1");
    set_var("LLM_TIMEOUT_SECS", "30");
    set_var("HOST", "127.0.0.1");
    set_var("PORT", "8081");
    set_var("MAX_UPLOAD_BYTES", "2048");
    set_var("LOG_FILE_ENABLED", "false");
    let config = Config::from_env().unwrap();
    assert_eq!(config.llm.provider, LLMProviderType::OpenAI);
    assert_eq!(config.llm.unrecognized_provider, None);
    assert_eq!(config.llm.model.as_deref(), Some("gpt-4o-mini"));
    assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:8080/v1"));
    assert_eq!(config.llm.timeout_secs, 30);
    assert_eq!(config.server.address(), "127.0.0.1:8081");
    assert_eq!(config.server.max_upload_bytes, 2048);
    assert!(!config.logging.file_enabled);
    assert!(config.logging.console_enabled);

    // Unknown providers fall back to Gemini
    set_var("LLM_PROVIDER", "claude");
    let config = Config::from_env().unwrap();
    assert_eq!(config.llm.provider, LLMProviderType::Gemini);
    assert_eq!(config.llm.unrecognized_provider.as_deref(), Some("claude"));

    // Unparseable numbers are errors
    set_var("PORT", "not-a-port");
    assert!(Config::from_env().is_err());
    set_var("PORT", "8081");
    set_var("LLM_TIMEOUT_SECS", "soon");
    assert!(Config::from_env().is_err());

    // Zero values load but fail validation
    set_var("LLM_TIMEOUT_SECS", "0");
    let config = Config::from_env().unwrap();
    assert!(config.validate().is_err());

    clear_vars();
}
