// ABOUTME: Centralized constants for the image-edit harness SDK
// ABOUTME: Contains hold-duration bounds, diagnostic preview limits, and storage defaults

/// Server-side result-hold configuration for synchronous invocations
pub mod hold {
    /// Minimum hold duration the server will be asked for, in milliseconds
    pub const MIN_WAIT_MS: u64 = 60_000;

    /// Maximum hold duration the server accepts, in milliseconds (5 minutes)
    pub const MAX_WAIT_MS: u64 = 300_000;
}

/// HTTP and request timeouts
pub mod timeouts {
    use std::time::Duration;

    /// Default client-side deadline for the synchronous call
    pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(300);
}

/// Endpoint API URLs
pub mod urls {
    /// Base URL for the serverless endpoint API
    pub const API_BASE: &str = "https://api.runpod.ai";
}

/// Bounds for diagnostic previews of remote payloads
pub mod previews {
    /// Maximum characters of an error response body kept for diagnostics
    pub const ERROR_BODY: usize = 800;

    /// Maximum characters of an unrecognized `output` value printed
    pub const OUTPUT: usize = 1200;

    /// Maximum characters of the raw response printed when `output` is absent
    pub const RAW_RESPONSE: usize = 1800;
}

/// Object-storage conventions for the worker-shared network volume
pub mod storage {
    /// Mount point under which uploaded objects are visible to the worker
    pub const WORKER_VOLUME_PREFIX: &str = "/runpod-volume";

    /// Key namespace for harness uploads
    pub const DEFAULT_KEY_PREFIX: &str = "imgedit_tests";

    /// Extension used when the source file has none
    pub const DEFAULT_EXTENSION: &str = ".png";
}

/// Truncate a string to at most `max` characters, on a character boundary.
pub fn preview(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_hold_constants() {
        assert_eq!(hold::MIN_WAIT_MS, 60_000);
        assert_eq!(hold::MAX_WAIT_MS, 300_000);
        assert!(hold::MIN_WAIT_MS < hold::MAX_WAIT_MS);
    }

    #[test]
    fn test_timeout_constants() {
        assert_eq!(timeouts::DEFAULT_CLIENT_TIMEOUT, Duration::from_secs(300));
    }

    #[test]
    fn test_url_constants() {
        assert!(urls::API_BASE.starts_with("https://"));
        assert!(!urls::API_BASE.ends_with('/'));
    }

    #[test]
    fn test_storage_constants() {
        assert!(storage::WORKER_VOLUME_PREFIX.starts_with('/'));
        assert!(!storage::DEFAULT_KEY_PREFIX.contains('/'));
        assert!(storage::DEFAULT_EXTENSION.starts_with('.'));
    }

    #[test]
    fn test_preview_truncation() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("0123456789abc", 10), "0123456789");
        // Multi-byte characters must not split
        assert_eq!(preview("héllo wörld", 5), "héllo");
    }
}
