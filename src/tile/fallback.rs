/// Per-tile image loading with URL fallbacks
///
/// Photos uploaded through the backend are served from cloud file storage,
/// which exposes the same file under several URLs. Some of them refuse
/// hot-linking or return an HTML viewer instead of image bytes, so each
/// tile walks an ordered list of equivalent URLs until one decodes.
use tracing::{debug, info, warn};

/// URL shape produced by the backend for uploaded files
const EXPORT_VIEW_MARKER: &str = "drive.google.com/uc?export=view&id=";

/// Size requested from the thumbnail service
const THUMBNAIL_SIZE: &str = "w400-h400";

/// Derive the ordered candidate URLs for `url`.
///
/// Export-view links yield four candidates (original, thumbnail service,
/// content host, file viewer); anything else yields just the original.
pub fn candidate_urls(url: &str) -> Vec<String> {
    match export_view_file_id(url) {
        Some(file_id) => vec![
            url.to_string(),
            format!("https://drive.google.com/thumbnail?id={}&sz={}", file_id, THUMBNAIL_SIZE),
            format!("https://lh3.googleusercontent.com/d/{}", file_id),
            format!("https://drive.google.com/file/d/{}/view", file_id),
        ],
        None => vec![url.to_string()],
    }
}

fn export_view_file_id(url: &str) -> Option<&str> {
    let start = url.find(EXPORT_VIEW_MARKER)? + EXPORT_VIEW_MARKER.len();
    let rest = &url[start..];
    let file_id = rest.split(['&', '#']).next().unwrap_or_default();
    (!file_id.is_empty()).then_some(file_id)
}

/// Where a tile is in its loading lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading { attempt: usize },
    Loaded { attempt: usize },
    /// Every candidate failed; terminal
    Failed { attempt: usize },
}

/// Fallback state machine for one rendered image
#[derive(Debug, Clone)]
pub struct FallbackLoader {
    original: String,
    candidates: Vec<String>,
    state: LoadState,
    last_attempt_failed: bool,
}

impl FallbackLoader {
    /// Build the loader for `url`. With fallbacks disabled only the
    /// original URL is ever attempted.
    pub fn new(url: &str, fallback_enabled: bool) -> Self {
        let candidates = if fallback_enabled {
            candidate_urls(url)
        } else {
            vec![url.to_string()]
        };

        Self {
            original: url.to_string(),
            candidates,
            state: LoadState::Idle,
            last_attempt_failed: false,
        }
    }

    pub fn original_url(&self) -> &str {
        &self.original
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn last_attempt_failed(&self) -> bool {
        self.last_attempt_failed
    }

    /// Index of the candidate currently (or last) attempted
    pub fn attempt(&self) -> usize {
        match self.state {
            LoadState::Idle => 0,
            LoadState::Loading { attempt }
            | LoadState::Loaded { attempt }
            | LoadState::Failed { attempt } => attempt,
        }
    }

    pub fn current_url(&self) -> &str {
        &self.candidates[self.attempt()]
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, LoadState::Loaded { .. } | LoadState::Failed { .. })
    }

    /// Begin loading the first candidate. Returns the URL to fetch, or
    /// `None` if the loader already started.
    pub fn start(&mut self) -> Option<&str> {
        if self.state != LoadState::Idle {
            return None;
        }
        self.state = LoadState::Loading { attempt: 0 };
        Some(self.current_url())
    }

    /// Record a load failure of the current candidate.
    ///
    /// Returns the next URL to fetch, or `None` once every candidate has
    /// failed (or if the loader is not loading).
    pub fn fail(&mut self) -> Option<&str> {
        let LoadState::Loading { attempt } = self.state else {
            return None;
        };

        self.last_attempt_failed = true;
        warn!(
            "Failed to load image (attempt {}): {}",
            attempt + 1,
            self.candidates[attempt]
        );

        if attempt + 1 < self.candidates.len() {
            self.state = LoadState::Loading { attempt: attempt + 1 };
            debug!("Trying fallback URL: {}", self.current_url());
            Some(self.current_url())
        } else {
            self.state = LoadState::Failed { attempt };
            warn!("All URL formats failed for {}", self.original);
            None
        }
    }

    /// Record a successful load of the current candidate
    pub fn succeed(&mut self) {
        if let LoadState::Loading { attempt } = self.state {
            self.state = LoadState::Loaded { attempt };
            self.last_attempt_failed = false;
            info!(
                "Successfully loaded image (attempt {}): {}",
                attempt + 1,
                self.current_url()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRIVE_URL: &str = "https://drive.google.com/uc?export=view&id=1AbC_xyz";

    #[test]
    fn test_export_view_url_has_four_candidates() {
        let candidates = candidate_urls(DRIVE_URL);
        assert_eq!(
            candidates,
            vec![
                DRIVE_URL.to_string(),
                "https://drive.google.com/thumbnail?id=1AbC_xyz&sz=w400-h400".to_string(),
                "https://lh3.googleusercontent.com/d/1AbC_xyz".to_string(),
                "https://drive.google.com/file/d/1AbC_xyz/view".to_string(),
            ]
        );
    }

    #[test]
    fn test_other_url_has_one_candidate() {
        let url = "https://example.com/photos/cat.jpg";
        assert_eq!(candidate_urls(url), vec![url.to_string()]);

        // Marker present but no file id
        let empty = "https://drive.google.com/uc?export=view&id=";
        assert_eq!(candidate_urls(empty), vec![empty.to_string()]);
    }

    #[test]
    fn test_file_id_stops_at_next_parameter() {
        let url = "https://drive.google.com/uc?export=view&id=abc123&resourcekey=k";
        assert_eq!(
            candidate_urls(url)[2],
            "https://lh3.googleusercontent.com/d/abc123"
        );
    }

    #[test]
    fn test_success_after_failures() {
        for failures in 0..4 {
            let mut loader = FallbackLoader::new(DRIVE_URL, true);
            let mut attempted = vec![loader.start().unwrap().to_string()];

            for _ in 0..failures {
                attempted.push(loader.fail().unwrap().to_string());
            }
            loader.succeed();

            assert_eq!(loader.state(), LoadState::Loaded { attempt: failures });
            assert_eq!(loader.current_url(), loader.candidates()[failures]);
            assert!(!loader.last_attempt_failed());

            // Never re-attempts a failed candidate
            let mut unique = attempted.clone();
            unique.dedup();
            assert_eq!(unique.len(), attempted.len());
            assert_eq!(attempted.as_slice(), &loader.candidates()[..=failures]);
        }
    }

    #[test]
    fn test_exhaustion_is_terminal() {
        let mut loader = FallbackLoader::new(DRIVE_URL, true);
        loader.start();
        for _ in 0..3 {
            assert!(loader.fail().is_some());
        }
        assert!(loader.fail().is_none());
        assert_eq!(loader.state(), LoadState::Failed { attempt: 3 });
        assert!(loader.last_attempt_failed());

        // No further attempts once failed
        assert!(loader.fail().is_none());
        assert!(loader.start().is_none());
        loader.succeed();
        assert_eq!(loader.state(), LoadState::Failed { attempt: 3 });
        assert!(loader.is_terminal());
    }

    #[test]
    fn test_single_candidate_fails_immediately() {
        let mut loader = FallbackLoader::new("https://example.com/a.jpg", true);
        assert_eq!(loader.start(), Some("https://example.com/a.jpg"));
        assert!(loader.fail().is_none());
        assert_eq!(loader.state(), LoadState::Failed { attempt: 0 });
    }

    #[test]
    fn test_fallback_disabled_uses_original_only() {
        let loader = FallbackLoader::new(DRIVE_URL, false);
        assert_eq!(loader.candidates(), &[DRIVE_URL.to_string()]);
        assert_eq!(loader.state(), LoadState::Idle);
        assert_eq!(loader.original_url(), DRIVE_URL);
    }
}
