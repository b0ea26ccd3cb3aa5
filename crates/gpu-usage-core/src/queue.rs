//! Hardware queue vocabulary of the V3D scheduler.
//!
//! The kernel names each queue either bare (`render`) or with a driver prefix
//! (`v3d_render`). Normalization strips at most one prefix from
//! [`DEVICE_PREFIXES`] and checks the remainder against [`QUEUE_KINDS`].

/// Queue kinds reported by the `gpu_usage` debugfs file.
pub const QUEUE_KINDS: &[&str] = &["bin", "render", "tfu", "csd", "cache_clean"];

/// Driver prefixes that may precede a queue kind.
pub const DEVICE_PREFIXES: &[&str] = &["v3d_"];

/// Canonical queue kind for a raw key, or `None` if the key is not a queue.
pub fn queue_kind(key: &str) -> Option<&'static str> {
    let bare = DEVICE_PREFIXES
        .iter()
        .find_map(|prefix| key.strip_prefix(prefix))
        .unwrap_or(key);
    QUEUE_KINDS.iter().copied().find(|kind| *kind == bare)
}

pub fn is_queue_key(key: &str) -> bool {
    queue_kind(key).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_prefixed_keys_resolve() {
        assert_eq!(queue_kind("bin"), Some("bin"));
        assert_eq!(queue_kind("v3d_render"), Some("render"));
        assert_eq!(queue_kind("v3d_cache_clean"), Some("cache_clean"));
        for kind in QUEUE_KINDS {
            assert!(is_queue_key(kind));
        }
    }

    #[test]
    fn only_one_leading_prefix_is_stripped() {
        assert_eq!(queue_kind("v3d_v3d_bin"), None);
        assert_eq!(queue_kind("bin_v3d_"), None);
        assert_eq!(queue_kind("render_v3d"), None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(!is_queue_key("foo"));
        assert!(!is_queue_key("timestamp"));
        assert!(!is_queue_key("QUEUE"));
        assert!(!is_queue_key("v3d_"));
        assert!(!is_queue_key(""));
        assert!(!is_queue_key("Render"));
    }
}
