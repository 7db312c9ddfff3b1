pub mod analysis_parser;
pub mod analysis_service;
pub mod api;
pub mod config;
pub mod errors;
pub mod llm_providers;
pub mod logging;
pub mod mind_map;
pub mod models;
pub mod quiz_engine;
pub mod request_encoder;
pub mod session;

pub use analysis_parser::{parse_analysis_result, validate_analysis_value};
pub use analysis_service::AnalysisService;
pub use errors::*;
pub use llm_providers::{AnalysisBackend, JsonResponseParser, LLMProvider, LLMProviderFactory, LLMProviderType};
pub use models::*;
pub use quiz_engine::{evaluate, grade};
pub use request_encoder::{ServiceRequest, encode};
pub use session::{QuizSession, QuizState, ScanGate, Workspace};
