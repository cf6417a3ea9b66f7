//! Application configuration loaded from environment variables.

use std::env;

use quill_core::ports::PageRequest;
use quill_infra::{DatabaseConfig, JwtConfig};
use quill_shared::dto::PageQuery;

/// Collection paging limits.
#[derive(Debug, Clone, Copy)]
pub struct PaginationConfig {
    pub default_per_page: u64,
    pub max_per_page: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_per_page: 10,
            max_per_page: 20,
        }
    }
}

impl PaginationConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_per_page = env::var("PAGE_SIZE_MAX")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&n: &u64| n > 0)
            .unwrap_or(defaults.max_per_page);

        Self {
            default_per_page: env::var("PAGE_SIZE_DEFAULT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.default_per_page)
                .clamp(1, max_per_page),
            max_per_page,
        }
    }

    /// Turn client paging parameters into a page window, clamped to limits.
    pub fn resolve(&self, query: PageQuery) -> PageRequest {
        let per_page = query
            .items_per_page
            .unwrap_or(self.default_per_page)
            .clamp(1, self.max_per_page);

        PageRequest::new(query.page.unwrap_or(1), per_page)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub pagination: PaginationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            pagination: PaginationConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_uses_defaults() {
        let page = PaginationConfig::default().resolve(PageQuery::default());
        assert_eq!(page, PageRequest::new(1, 10));
    }

    #[test]
    fn test_resolve_clamps_to_maximum() {
        let page = PaginationConfig::default().resolve(PageQuery {
            page: Some(2),
            items_per_page: Some(500),
        });
        assert_eq!(page.per_page, 20);
        assert_eq!(page.page, 2);
    }

    #[test]
    fn test_resolve_bounds_huge_page() {
        let page = PaginationConfig::default().resolve(PageQuery {
            page: Some(u64::MAX),
            items_per_page: None,
        });
        assert!(page.page < u64::MAX);
        assert_eq!(page.offset(), (page.page - 1) * 10);
    }

    #[test]
    fn test_resolve_rejects_zero() {
        let page = PaginationConfig::default().resolve(PageQuery {
            page: Some(0),
            items_per_page: Some(0),
        });
        assert_eq!(page, PageRequest::new(1, 1));
    }
}
