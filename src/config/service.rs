use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity of the running service.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct ServiceConfig {
    pub name: String,
    pub role: ServiceRole,
}

/// Which side of the two-service setup this process plays.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ServiceRole {
    /// Serves `/hello` and calls the upstream on every request.
    Frontend,
    /// Answers every path and counts the calls it receives.
    Backend,
}

impl ServiceRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceRole::Frontend => "frontend",
            ServiceRole::Backend => "backend",
        }
    }
}

/// The service called by the frontend.
#[derive(Deserialize, Serialize, Debug, Clone, JsonSchema)]
pub struct UpstreamConfig {
    pub url: String,
    #[serde(default = "default_timeout_in_ms")]
    pub timeout_in_ms: u64,
}

fn default_timeout_in_ms() -> u64 {
    3000
}
