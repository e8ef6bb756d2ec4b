use std::net::{IpAddr, Ipv4Addr, SocketAddr};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub quiz: QuizConfig,
}

/// Question counts for the quiz endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    pub default_count: usize,
    pub max_count: usize,
}

impl QuizConfig {
    pub fn from_env() -> Self {
        let default_count = env_usize("QUIZ_DEFAULT_COUNT")
            .filter(|count| *count > 0)
            .unwrap_or(ai_info_core::quiz::DEFAULT_QUESTION_COUNT);
        let max_count = env_usize("QUIZ_MAX_COUNT")
            .filter(|count| *count > 0)
            .unwrap_or(20)
            .max(default_count);

        Self {
            default_count,
            max_count,
        }
    }

    /// Requested count, or the default, clamped to `1..=max_count`.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_count)
            .clamp(1, self.max_count)
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            default_count: ai_info_core::quiz::DEFAULT_QUESTION_COUNT,
            max_count: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            host,
            port,
            log_level,
            quiz: QuizConfig::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn env_usize(key: &str) -> Option<usize> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
}
