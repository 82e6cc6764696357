//! Conditional disabling of the dependent field by the primary value.
//!
//! Stateless: every run is a pure function of the primary value at that
//! moment. The only side effects are on the dependent control itself.

use crate::page::Page;
use crate::types::{ControlId, FieldKind};

/// Primary values that disable the dependent field, compared
/// case-insensitively.
const DISABLE_VALUES: [&str; 2] = ["common", "secondary"];

/// What the caller must do after a toggle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ToggleEffect {
    /// The dependent was cleared through the notifying path; the caller
    /// must dispatch a change event on it so bound handlers observe the
    /// clear.
    ClearedWithNotice(ControlId),
    /// No change dispatch required.
    Quiet,
}

/// Whether a primary value puts the dependent field out of play.
pub(crate) fn disables_dependent(primary_value: &str) -> bool {
    let lowered = primary_value.to_lowercase();
    return DISABLE_VALUES.contains(&lowered.as_str());
}

/// Apply the toggle: disable and clear the dependent when the primary value
/// is in the disable set, enable it otherwise (without touching its value).
///
/// Clearing a select goes through the notifying path so enhancement layers
/// that listen on change observe it. When the widget hook rejects the
/// notification, the value is cleared plainly instead — the field must
/// never stay disabled with a stale value. Text inputs always clear
/// plainly. No-op when the dependent is unresolved.
pub(crate) fn toggle(
    page: &mut Page,
    primary_value: &str,
    dependent: Option<ControlId>,
) -> ToggleEffect {
    let Some(dependent) = dependent else {
        return ToggleEffect::Quiet;
    };

    if !disables_dependent(primary_value) {
        page.set_disabled(dependent, false);
        return ToggleEffect::Quiet;
    }

    page.set_disabled(dependent, true);

    let kind = page.control(dependent).map(|control| return control.kind);
    if kind != Some(FieldKind::Select) {
        page.set_value(dependent, "");
        return ToggleEffect::Quiet;
    }

    page.set_value(dependent, "");
    return match page.notify_widget(dependent) {
        Ok(()) => ToggleEffect::ClearedWithNotice(dependent),
        Err(error) => {
            tracing::debug!(%error, "widget rejected clear, falling back to plain clear");
            page.set_value(dependent, "");
            ToggleEffect::Quiet
        },
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::page::Control;
    use crate::types::ScopeId;

    fn page_with_trade(value: &str) -> (Page, ControlId) {
        let mut page = Page::new();
        let trade = page.add_control(
            ScopeId::DOCUMENT,
            Control::select("id_trade", "trade").with_value(value),
        );
        return (page, trade);
    }

    #[test]
    fn disable_set_is_case_insensitive() {
        for value in ["secondary", "Secondary", "SECONDARY", "common", "COMMON", "Common"] {
            assert!(disables_dependent(value), "{value} should disable");
        }
        for value in ["General", "", "primary", "commons"] {
            assert!(!disables_dependent(value), "{value} should not disable");
        }
    }

    #[test]
    fn disabling_value_clears_and_requests_notice() {
        let (mut page, trade) = page_with_trade("5");
        let effect = toggle(&mut page, "Secondary", Some(trade));
        assert_eq!(effect, ToggleEffect::ClearedWithNotice(trade));
        assert!(page.is_disabled(trade));
        assert_eq!(page.value(trade), "");
    }

    #[test]
    fn other_values_enable_without_touching_value() {
        let (mut page, trade) = page_with_trade("5");
        page.set_disabled(trade, true);
        let effect = toggle(&mut page, "General", Some(trade));
        assert_eq!(effect, ToggleEffect::Quiet);
        assert!(!page.is_disabled(trade));
        assert_eq!(page.value(trade), "5");
    }

    #[test]
    fn rejected_notice_still_clears_plainly() {
        let (mut page, trade) = page_with_trade("5");
        page.set_widget_hook(trade, Box::new(|_| return Err("no widget".to_string())));
        let effect = toggle(&mut page, "COMMON", Some(trade));
        assert_eq!(effect, ToggleEffect::Quiet);
        assert!(page.is_disabled(trade));
        assert_eq!(page.value(trade), "");
    }

    #[test]
    fn text_inputs_clear_without_notice() {
        let mut page = Page::new();
        let trade = page.add_control(
            ScopeId::DOCUMENT,
            Control::text("id_trade", "trade").with_value("5"),
        );
        let effect = toggle(&mut page, "secondary", Some(trade));
        assert_eq!(effect, ToggleEffect::Quiet);
        assert_eq!(page.value(trade), "");
    }

    #[test]
    fn unresolved_dependent_is_a_noop() {
        let mut page = Page::new();
        assert_eq!(toggle(&mut page, "Secondary", None), ToggleEffect::Quiet);
    }
}
