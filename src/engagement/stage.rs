//! Conversational stage selection.

/// The bot's conversational posture.
///
/// Nominal progression is Confused → Probing → Delaying → Exit, but the stage is
/// recomputed from scratch every turn, so content can move it in any direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Stage {
    #[default]
    Confused,
    Probing,
    Delaying,
    Exit,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confused => "confused",
            Self::Probing => "probing",
            Self::Delaying => "delaying",
            Self::Exit => "exit",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content that means the counterpart is pushing a link.
const LINK_INDICATORS: &[&str] = &["http", "https", "link"];

/// Content asking for an irreversible disclosure.
const CRITICAL_INDICATORS: &[&str] = &["otp", "upi"];

/// Pick the stage for this turn. First matching rule wins:
///
/// 1. a link indicator → `Exit`
/// 2. a critical-disclosure indicator with at least two messages → `Delaying`
/// 3. otherwise by count: ≤2 `Confused`, ≤4 `Probing`, ≤7 `Delaying`, else `Exit`
///
/// `_prior` does not gate transitions.
pub fn select_stage(text: &str, message_count: usize, _prior: Stage) -> Stage {
    let lower = text.to_lowercase();

    if LINK_INDICATORS.iter().any(|k| lower.contains(k)) {
        return Stage::Exit;
    }
    if message_count >= 2 && CRITICAL_INDICATORS.iter().any(|k| lower.contains(k)) {
        return Stage::Delaying;
    }

    match message_count {
        0..=2 => Stage::Confused,
        3..=4 => Stage::Probing,
        5..=7 => Stage::Delaying,
        _ => Stage::Exit,
    }
}
