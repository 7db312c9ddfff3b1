use std::time::Duration;
use textbook_scanner::{AnalysisError, AnalysisService, LLMProviderType};

// Nothing listens on port 1, so every call fails before reaching a provider.
const UNREACHABLE_BASE_URL: &str = "http://127.0.0.1:1";

fn unreachable_service_with_key(provider: LLMProviderType, api_key: &str) -> AnalysisService {
    AnalysisService::new_with_provider(
        api_key.to_string(),
        Some(UNREACHABLE_BASE_URL.to_string()),
        provider,
        None,
        Duration::from_secs(5),
    )
    .unwrap()
}

fn unreachable_service(provider: LLMProviderType) -> AnalysisService {
    unreachable_service_with_key(provider, "test-api-key")
}

#[test]
fn test_all_providers_report_identity() {
    let cases = vec![
        (LLMProviderType::OpenAI, "OpenAI", "gpt-4o-mini"),
        (LLMProviderType::Gemini, "Gemini", "gemini-3-flash-preview"),
    ];

    for (provider, name, model) in cases {
        let service = unreachable_service(provider);
        assert_eq!(service.provider_name(), name);
        assert_eq!(service.model_name(), model);
    }

    let custom = AnalysisService::new_gemini("key".to_string(), Some("gemini-2.5-pro".to_string())).unwrap();
    assert_eq!(custom.model_name(), "gemini-2.5-pro");
}

#[tokio::test]
async fn test_unreachable_service_is_a_call_failure() {
    for provider in [LLMProviderType::OpenAI, LLMProviderType::Gemini] {
        let service = unreachable_service(provider);
        let result = service.analyze_image(b"fake image", "image/jpeg").await;

        match result {
            Err(AnalysisError::ServiceCallFailure(message)) => {
                assert!(!message.is_empty(), "{:?} should describe the failure", provider);
            }
            other => panic!("{:?}: expected a service call failure, got {:?}", provider, other),
        }
    }
}

#[tokio::test]
async fn test_call_failure_does_not_expose_api_key() {
    const KEY: &str = "SECRET-KEY-123";

    for provider in [LLMProviderType::OpenAI, LLMProviderType::Gemini] {
        let service = unreachable_service_with_key(provider, KEY);
        let error = service
            .analyze_image(b"fake image", "image/jpeg")
            .await
            .unwrap_err();

        assert!(matches!(error, AnalysisError::ServiceCallFailure(_)));
        assert!(
            !error.to_string().contains(KEY),
            "{:?} failure leaked the API key: {}",
            provider,
            error
        );
    }
}
