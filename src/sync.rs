//! Assignment-field repopulation keyed by the dependent and primary values.
//!
//! The planning half decides, without blocking, whether this sync resets
//! the field, submits a lookup, or does nothing. The applying half maps a
//! classified response onto the option list. The controller sits between
//! the two, owning the request channel and the change dispatch.

use crate::lookup::LookupResponse;
use crate::page::Page;
use crate::selector;
use crate::types::{ControlId, FieldRole, LookupQuery, OptionEntry, ScopeId};

/// What a sync run decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SyncDecision {
    /// No assignment field in this scope — nothing to populate.
    Inactive,
    /// A lookup must be submitted for the assignment field.
    Submit {
        /// The assignment field the reply will land on.
        assignment: ControlId,
        /// The query to send.
        query: LookupQuery,
    },
    /// The field was reset to the blank-only list; the caller must
    /// dispatch a change on it.
    WasReset(ControlId),
}

/// Map a classified response onto the assignment field. The option list is
/// always cleared and re-seeded with the placeholder first. Returns whether
/// the caller must dispatch a change event.
pub(crate) fn apply_response(
    page: &mut Page,
    assignment: ControlId,
    response: &LookupResponse,
) -> bool {
    page.set_options(assignment, vec![OptionEntry::placeholder()]);
    page.set_value(assignment, "");

    return match response {
        LookupResponse::Many(entries) => {
            for entry in entries {
                page.push_option(assignment, entry.clone());
            }
            true
        },
        LookupResponse::NoMatch => false,
        LookupResponse::Single(entry) => {
            page.push_option(assignment, entry.clone());
            page.set_value(assignment, entry.value.clone());
            if let Err(error) = page.notify_widget(assignment) {
                // The selection stands even when the widget cannot be told.
                tracing::debug!(%error, "widget rejected assignment selection notice");
            }
            true
        },
    };
}

/// Run the short-circuiting decision chain for one scope.
///
/// The assignment field is resolved fresh every time — formset re-scans can
/// change which control answers for the role. Reset (blank-only list) when
/// the dependent is unresolved, disabled, or empty; otherwise build the
/// query from the live field values.
pub(crate) fn plan(
    page: &mut Page,
    scope: ScopeId,
    primary: Option<ControlId>,
    dependent: Option<ControlId>,
) -> SyncDecision {
    let Some(assignment) = selector::resolve(page, scope, FieldRole::Assignment) else {
        return SyncDecision::Inactive;
    };

    let Some(dependent) = dependent else {
        reset_to_placeholder(page, assignment);
        return SyncDecision::WasReset(assignment);
    };

    if page.is_disabled(dependent) {
        reset_to_placeholder(page, assignment);
        return SyncDecision::WasReset(assignment);
    }

    let trade_id = page.value(dependent).to_string();
    if trade_id.is_empty() {
        reset_to_placeholder(page, assignment);
        return SyncDecision::WasReset(assignment);
    }

    let paper_type = primary.map_or_else(String::new, |id| return page.value(id).to_string());

    return SyncDecision::Submit {
        assignment,
        query: LookupQuery { paper_type, trade_id },
    };
}

/// Reduce the assignment field to the blank placeholder only.
fn reset_to_placeholder(page: &mut Page, assignment: ControlId) {
    page.set_options(assignment, vec![OptionEntry::placeholder()]);
    page.set_value(assignment, "");
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;
    use crate::page::Control;

    /// Document page with the full trio; returns (page, primary, dependent).
    fn linked_page() -> (Page, ControlId, ControlId) {
        let mut page = Page::new();
        let primary = page.add_control(
            ScopeId::DOCUMENT,
            Control::select("id_question_paper", "question_paper"),
        );
        let dependent =
            page.add_control(ScopeId::DOCUMENT, Control::select("id_trade", "trade"));
        page.add_control(
            ScopeId::DOCUMENT,
            Control::select("id_qp_assign", "qp_assign"),
        );
        return (page, primary, dependent);
    }

    #[test]
    fn no_assignment_field_is_inactive() {
        let mut page = Page::new();
        let decision = plan(&mut page, ScopeId::DOCUMENT, None, None);
        assert_eq!(decision, SyncDecision::Inactive);
    }

    #[test]
    fn unresolved_dependent_resets() {
        let (mut page, primary, _) = linked_page();
        let decision = plan(&mut page, ScopeId::DOCUMENT, Some(primary), None);
        assert!(matches!(decision, SyncDecision::WasReset(_)));
    }

    #[test]
    fn disabled_dependent_resets_and_discards_prior_options() {
        let (mut page, primary, dependent) = linked_page();
        page.set_disabled(dependent, true);
        page.set_value(dependent, "5");
        let decision = plan(&mut page, ScopeId::DOCUMENT, Some(primary), Some(dependent));

        let SyncDecision::WasReset(assignment) = decision else {
            panic!("expected reset, got {decision:?}");
        };
        assert_eq!(page.options(assignment), &[OptionEntry::placeholder()]);
        assert_eq!(page.value(assignment), "");
    }

    #[test]
    fn empty_dependent_value_resets() {
        let (mut page, primary, dependent) = linked_page();
        let decision = plan(&mut page, ScopeId::DOCUMENT, Some(primary), Some(dependent));
        assert!(matches!(decision, SyncDecision::WasReset(_)));
    }

    #[test]
    fn live_dependent_submits_with_both_values() {
        let (mut page, primary, dependent) = linked_page();
        page.set_value(primary, "General");
        page.set_value(dependent, "12");
        let decision = plan(&mut page, ScopeId::DOCUMENT, Some(primary), Some(dependent));

        assert_eq!(
            decision,
            SyncDecision::Submit {
                assignment: ControlId(2),
                query: LookupQuery {
                    paper_type: "General".to_string(),
                    trade_id: "12".to_string(),
                },
            }
        );
    }

    #[test]
    fn unresolved_primary_reads_as_empty_paper_type() {
        let mut page = Page::new();
        let dependent = page
            .add_control(ScopeId::DOCUMENT, Control::select("id_trade", "trade").with_value("9"));
        page.add_control(
            ScopeId::DOCUMENT,
            Control::select("id_qp_assign", "qp_assign"),
        );
        let decision = plan(&mut page, ScopeId::DOCUMENT, None, Some(dependent));

        let SyncDecision::Submit { query, .. } = decision else {
            panic!("expected submit, got {decision:?}");
        };
        assert_eq!(query.paper_type, "");
        assert_eq!(query.trade_id, "9");
    }

    #[test]
    fn single_response_populates_and_selects() {
        let (mut page, _, _) = linked_page();
        let assignment = ControlId(2);
        let response = LookupResponse::Single(OptionEntry::new("7", "Paper A"));
        assert!(apply_response(&mut page, assignment, &response));

        assert_eq!(
            page.options(assignment),
            &[OptionEntry::placeholder(), OptionEntry::new("7", "Paper A")]
        );
        assert_eq!(page.value(assignment), "7");
    }

    #[test]
    fn many_response_appends_without_selecting() {
        let (mut page, _, _) = linked_page();
        let assignment = ControlId(2);
        let response = LookupResponse::Many(vec![
            OptionEntry::new("3", "Paper C"),
            OptionEntry::new("1", "Paper A"),
        ]);
        assert!(apply_response(&mut page, assignment, &response));

        assert_eq!(page.options(assignment).len(), 3);
        assert_eq!(page.value(assignment), "");
    }

    #[test]
    fn no_match_leaves_placeholder_only_and_stays_quiet() {
        let (mut page, _, _) = linked_page();
        let assignment = ControlId(2);
        page.set_options(assignment, vec![OptionEntry::new("9", "Stale")]);
        page.set_value(assignment, "9");

        assert!(!apply_response(&mut page, assignment, &LookupResponse::NoMatch));
        assert_eq!(page.options(assignment), &[OptionEntry::placeholder()]);
        assert_eq!(page.value(assignment), "");
    }
}
