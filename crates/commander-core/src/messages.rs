//! Localized user-facing messages.
//!
//! A lookup table from message id × locale to a template. English is the
//! mandatory fallback; templates use `{name}` placeholders.

use serde::{Deserialize, Serialize};

/// Supported message locales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    /// Parse a locale code such as `en`, `en-US`, `zh-CN`. Unknown codes fall
    /// back to English.
    pub fn from_code(code: &str) -> Self {
        let primary = code
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "zh" => Locale::Zh,
            _ => Locale::En,
        }
    }
}

/// Identifier for each localized message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageId {
    /// `{count}`, `{max}`
    PhaseLimitReached,
    /// `{spent}`, `{max}`
    BudgetExhausted,
    /// `{spent}`, `{limit}`
    PhaseOverrun,
    /// `{reason}`
    Interrupted,
    /// Default cancellation reason when the signal carries none.
    CancelledByUser,
    /// Note appended to a report when execution stopped early.
    StoppedEarlyNote,
    /// `{error}`
    PhaseFailedNote,
    /// Heading for prior phase outputs in an effective goal.
    PriorContextHeading,
}

fn english(id: MessageId) -> &'static str {
    match id {
        MessageId::PhaseLimitReached => "Phase limit reached ({count}/{max}); no more agents can be hired.",
        MessageId::BudgetExhausted => "Total budget exhausted (spent {spent} of {max} wei).",
        MessageId::PhaseOverrun => "Phase spend {spent} wei exceeded the per-phase limit of {limit} wei.",
        MessageId::Interrupted => "Mission interrupted: {reason}",
        MessageId::CancelledByUser => "cancelled by user",
        MessageId::StoppedEarlyNote => "Note: execution was interrupted before all planned phases ran.",
        MessageId::PhaseFailedNote => "failed: {error}",
        MessageId::PriorContextHeading => "Context from previous phases:",
    }
}

fn chinese(id: MessageId) -> Option<&'static str> {
    let text = match id {
        MessageId::PhaseLimitReached => "已达到阶段上限（{count}/{max}），无法继续雇佣代理。",
        MessageId::BudgetExhausted => "总预算已耗尽（已花费 {spent} / {max} wei）。",
        MessageId::PhaseOverrun => "本阶段花费 {spent} wei，超出单阶段上限 {limit} wei。",
        MessageId::Interrupted => "任务已中断（interrupted）：{reason}",
        MessageId::CancelledByUser => "用户取消",
        MessageId::StoppedEarlyNote => "注意：执行在完成全部计划阶段前被中断。",
        MessageId::PhaseFailedNote => "失败：{error}",
        MessageId::PriorContextHeading => return None,
    };
    Some(text)
}

/// Template for `id` in `locale`, falling back to English.
pub fn template(id: MessageId, locale: Locale) -> &'static str {
    match locale {
        Locale::En => english(id),
        Locale::Zh => chinese(id).unwrap_or_else(|| english(id)),
    }
}

/// Render a message, substituting `{name}` placeholders.
pub fn render(id: MessageId, locale: Locale, args: &[(&str, &str)]) -> String {
    let mut text = template(id, locale).to_string();
    for (name, value) in args {
        text = text.replace(&format!("{{{name}}}"), value);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_code() {
        assert_eq!(Locale::from_code("zh-CN"), Locale::Zh);
        assert_eq!(Locale::from_code("ZH"), Locale::Zh);
        assert_eq!(Locale::from_code("en_US"), Locale::En);
        assert_eq!(Locale::from_code("fr"), Locale::En);
        assert_eq!(Locale::from_code(""), Locale::En);
    }

    #[test]
    fn test_render_substitutes() {
        let text = render(
            MessageId::PhaseLimitReached,
            Locale::En,
            &[("count", "6"), ("max", "6")],
        );
        assert_eq!(
            text,
            "Phase limit reached (6/6); no more agents can be hired."
        );
    }

    #[test]
    fn test_english_fallback() {
        assert_eq!(
            template(MessageId::PriorContextHeading, Locale::Zh),
            template(MessageId::PriorContextHeading, Locale::En)
        );
    }

    #[test]
    fn test_interrupted_mentions_keyword_in_every_locale() {
        for locale in [Locale::En, Locale::Zh] {
            let text = render(MessageId::Interrupted, locale, &[("reason", "x")]);
            assert!(text.to_lowercase().contains("interrupted"));
        }
    }
}
