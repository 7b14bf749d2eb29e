//! # seedbridge-foundation
//!
//! Foundation layer for SeedBridge:
//! - Error: 프로세스 수준 에러 (설정 로드 실패 등)
//! - Config: 엔드포인트 레지스트리 원본, 재시도/HTTP/도구 설정
//!
//! ## 아키텍처
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Tool Surface (stdio MCP)                    │
//! │              │                               │
//! │              ▼                               │
//! │  Dispatcher ── Registry ── PayloadResolver   │
//! │              │                               │
//! │              ▼                               │
//! │  ResilientExecutor ── HttpTransport          │
//! └──────────────────────────────────────────────┘
//!          ▲
//!          └── BridgeConfig (이 crate)
//! ```

pub mod config;
pub mod error;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config
// ============================================================================
pub use config::{
    BridgeConfig, ConfigFormat, ConfigLoader, EndpointConfig, HttpConfig, RetryConfig,
    ToolsConfig,
};
