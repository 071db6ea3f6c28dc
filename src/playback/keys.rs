use crate::pipeline::FullscreenMode;

/// Semantic key events, decoupled from physical key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    PauseToggle,
    Quit,
    FullscreenToggle,
    FullscreenSelect(FullscreenMode),
    Rewind,
    FastForward,
    /// A key with no binding
    Unbound(char),
}

impl KeyEvent {
    /// Fixed bindings: space, `q`, `f`, `a`, `d`, `1`–`4`
    pub fn from_char(key: char) -> Self {
        match key {
            ' ' => KeyEvent::PauseToggle,
            'q' => KeyEvent::Quit,
            'f' => KeyEvent::FullscreenToggle,
            'a' => KeyEvent::Rewind,
            'd' => KeyEvent::FastForward,
            '1' => KeyEvent::FullscreenSelect(FullscreenMode::Original),
            '2' => KeyEvent::FullscreenSelect(FullscreenMode::Grayscale),
            '3' => KeyEvent::FullscreenSelect(FullscreenMode::Blur),
            '4' => KeyEvent::FullscreenSelect(FullscreenMode::EdgeDetect),
            other => KeyEvent::Unbound(other),
        }
    }

    /// Help text listing every binding
    pub fn help() -> &'static str {
        "space pause/play | q quit | f fullscreen | a rewind | d fast-forward | 1-4 original/grayscale/blur/edges"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings() {
        assert_eq!(KeyEvent::from_char(' '), KeyEvent::PauseToggle);
        assert_eq!(KeyEvent::from_char('q'), KeyEvent::Quit);
        assert_eq!(KeyEvent::from_char('f'), KeyEvent::FullscreenToggle);
        assert_eq!(KeyEvent::from_char('a'), KeyEvent::Rewind);
        assert_eq!(KeyEvent::from_char('d'), KeyEvent::FastForward);
        assert_eq!(
            KeyEvent::from_char('4'),
            KeyEvent::FullscreenSelect(FullscreenMode::EdgeDetect)
        );
    }

    #[test]
    fn test_bindings_are_case_sensitive() {
        assert_eq!(KeyEvent::from_char('Q'), KeyEvent::Unbound('Q'));
        assert_eq!(KeyEvent::from_char('5'), KeyEvent::Unbound('5'));
    }
}
