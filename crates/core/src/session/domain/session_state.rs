/// Whether landmark tracking is running for the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackingStatus {
    Initializing,
    Active,
    /// The detector failed to load; video still flows, without an overlay.
    Unavailable(String),
}

/// What the UI layer renders: loading, permission prompt, live view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    pub is_loading: bool,
    /// `None` until permission has been requested.
    pub has_permission: Option<bool>,
    pub is_face_detected: bool,
    /// User-facing message for the retry prompt.
    pub error: Option<String>,
    pub tracking: TrackingStatus,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            is_loading: true,
            has_permission: None,
            is_face_detected: false,
            error: None,
            tracking: TrackingStatus::Initializing,
        }
    }
}

impl SessionState {
    /// Camera granted and loading finished.
    pub fn is_live(&self) -> bool {
        self.has_permission == Some(true) && !self.is_loading
    }

    /// Permission not requested yet, or refused and worth retrying.
    pub fn needs_permission_prompt(&self) -> bool {
        self.has_permission != Some(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = SessionState::default();
        assert!(state.is_loading);
        assert_eq!(state.has_permission, None);
        assert!(state.needs_permission_prompt());
        assert!(!state.is_live());
    }

    #[test]
    fn test_live_once_granted_and_loaded() {
        let state = SessionState {
            is_loading: false,
            has_permission: Some(true),
            ..SessionState::default()
        };
        assert!(state.is_live());
        assert!(!state.needs_permission_prompt());
    }

    #[test]
    fn test_denied_still_prompts() {
        let state = SessionState {
            has_permission: Some(false),
            ..SessionState::default()
        };
        assert!(state.needs_permission_prompt());
    }
}
