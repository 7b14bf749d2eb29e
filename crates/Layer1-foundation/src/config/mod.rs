//! Config - 설정 관리
//!
//! - `bridge.rs` - BridgeConfig (엔드포인트, 재시도, 도구)
//! - `loader.rs` - 파일 탐색/파싱/덮어쓰기
//! - `env.rs` - `${VAR}` 확장

mod bridge;
mod env;
mod loader;

pub use bridge::{
    BridgeConfig, EndpointConfig, HttpConfig, RetryConfig, ToolsConfig, SUPPORTED_METHODS,
};
pub use env::expand_env_var;
pub use loader::{
    parse_config, ConfigFormat, ConfigLoader, BASE_URL_ENV, CONFIG_ENV, CONFIG_FILE,
    PROJECT_CONFIG_FILE,
};
