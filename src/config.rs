use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub graph: GraphConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Page size for follower/following listings.
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Maximum number of followees fanned out per feed request. Viewers
    /// following more than this are served from the most recently followed.
    pub max_fanout: u32,
    /// Maximum content pages fetched per author during fan-out.
    pub max_author_pages: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { page_size: 20 }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            max_fanout: 500,
            max_author_pages: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite:data/follow_graph.db".to_string()),
            },
            graph: GraphConfig {
                page_size: env::var("LIST_PAGE_SIZE")
                    .unwrap_or_else(|_| "20".to_string())
                    .parse()
                    .unwrap_or(20),
            },
            feed: FeedConfig {
                max_fanout: env::var("FEED_MAX_FANOUT")
                    .unwrap_or_else(|_| "500".to_string())
                    .parse()
                    .unwrap_or(500),
                max_author_pages: env::var("FEED_MAX_AUTHOR_PAGES")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()
                    .unwrap_or(10),
            },
        })
    }
}
