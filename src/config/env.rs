// src/config/env.rs
// DOCUMENTATION: Environment variable management
// PURPOSE: Load and validate configuration from .env files

use dotenv::dotenv;
use std::env;
use std::str::FromStr;

/// Application configuration loaded from environment variables
/// DOCUMENTATION: Centralizes all configuration in one struct
/// Load with Config::from_env() at application startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "127.0.0.1")
    pub server_address: String,

    /// Server listen port (default 8003)
    pub server_port: u16,

    /// Environment: development, staging, production
    pub environment: String,

    /// Log level: debug, info, warn, error
    pub log_level: String,

    /// Root URL of the internal catalog backend (places, ratings, search)
    pub api_base_url: String,

    /// Google Places API Key
    pub google_places_api_key: String,

    /// Base URL for Google Places API
    pub google_places_base_url: String,

    /// Width of the map viewport in pixels, used for zoom level derivation
    pub viewport_width_px: f64,

    /// Quiet period before a region change triggers a nearby search
    pub region_debounce_ms: u64,

    /// Quiet period before a keystroke triggers a text search (300-500)
    pub text_search_debounce_ms: u64,

    /// Per-request timeout for backend and provider calls
    pub request_timeout_secs: u64,

    /// Local quota guard for provider calls
    pub provider_requests_per_second: u32,

    /// Pinned locale for provider text search
    pub search_language: String,
    pub search_region: String,

    /// Category filter for provider nearby search (pipe separated)
    pub nearby_categories: String,

    /// Width requested when building provider photo URLs
    pub photo_max_width: u32,
}

impl Config {
    /// Load configuration from environment variables
    /// DOCUMENTATION: Reads from .env or process environment
    /// Called once at application startup
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenv().ok();

        Config {
            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),

            server_port: parse_var("SERVER_PORT", 8003),

            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api".to_string()),

            google_places_api_key: env::var("GOOGLE_PLACES_API_KEY")
                .unwrap_or_else(|_| String::new()),

            google_places_base_url: env::var("GOOGLE_PLACES_BASE_URL")
                .unwrap_or_else(|_| "https://maps.googleapis.com/maps/api/place".to_string()),

            viewport_width_px: parse_var("VIEWPORT_WIDTH_PX", 390.0),

            region_debounce_ms: parse_var("REGION_DEBOUNCE_MS", 500),

            text_search_debounce_ms: parse_var("TEXT_SEARCH_DEBOUNCE_MS", 500),

            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", 15),

            provider_requests_per_second: parse_var("PROVIDER_REQUESTS_PER_SECOND", 10),

            search_language: env::var("SEARCH_LANGUAGE").unwrap_or_else(|_| "en".to_string()),

            search_region: env::var("SEARCH_REGION").unwrap_or_else(|_| "us".to_string()),

            nearby_categories: env::var("NEARBY_CATEGORIES").unwrap_or_else(|_| {
                "tourist_attraction|museum|park|restaurant|point_of_interest".to_string()
            }),

            photo_max_width: parse_var("PHOTO_MAX_WIDTH", 400),
        }
    }

    /// Validate critical configuration
    /// DOCUMENTATION: Ensures application can start safely
    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.is_empty() {
            return Err("API_BASE_URL is required".to_string());
        }

        if !(self.viewport_width_px.is_finite() && self.viewport_width_px > 0.0) {
            return Err("VIEWPORT_WIDTH_PX must be a positive number".to_string());
        }

        if !(300..=500).contains(&self.text_search_debounce_ms) {
            return Err(format!(
                "TEXT_SEARCH_DEBOUNCE_MS must be between 300 and 500, got {}",
                self.text_search_debounce_ms
            ));
        }

        if self.google_places_api_key.is_empty() {
            log::warn!("GOOGLE_PLACES_API_KEY not configured - provider markers will stay empty");
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            server_address: "127.0.0.1".to_string(),
            server_port: 8003,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            api_base_url: "http://localhost:3000/api".to_string(),
            google_places_api_key: "key".to_string(),
            google_places_base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            viewport_width_px: 390.0,
            region_debounce_ms: 500,
            text_search_debounce_ms: 500,
            request_timeout_secs: 15,
            provider_requests_per_second: 10,
            search_language: "en".to_string(),
            search_region: "us".to_string(),
            nearby_categories: "museum".to_string(),
            photo_max_width: 400,
        }
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_width() {
        let mut config = sample();
        config.viewport_width_px = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_text_debounce_out_of_range() {
        let mut config = sample();
        config.text_search_debounce_ms = 1200;
        assert!(config.validate().is_err());

        config.text_search_debounce_ms = 300;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        std::env::set_var("STORYMAP_TEST_GARBAGE_PORT", "not-a-number");
        assert_eq!(parse_var("STORYMAP_TEST_GARBAGE_PORT", 42u16), 42);
        std::env::remove_var("STORYMAP_TEST_GARBAGE_PORT");
    }
}
