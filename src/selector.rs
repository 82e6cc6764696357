//! Ordered fallback selectors for locating linked fields within a scope.
//!
//! The admin form's field naming is not stable across configurations, so
//! each role carries several plausible naming schemes tried in priority
//! order. The first strategy with at least one matching control wins, and
//! the first matching control in page order is the resolved field. Nothing
//! matching is not an error — the behavior is simply inactive for that
//! scope.

use crate::page::{Control, Page};
use crate::types::{ControlId, FieldKind, FieldRole, ScopeId};

/// Candidates for the assignment field, including two historical naming
/// fallbacks seen on older forms.
const ASSIGNMENT_CANDIDATES: [Selector; 6] = [
    Selector::Id("id_qp_assign"),
    Selector::Name("qp_assign"),
    Selector::NameSuffix("qp_assign"),
    Selector::Id("id_qpassign"),
    Selector::NameSuffix("questionpaper_assign"),
    Selector::SelectIdPrefixNameSuffix {
        id_prefix: "id_",
        name_suffix: "qp_assign",
    },
];

/// Candidates for the dependent (trade) field.
const DEPENDENT_CANDIDATES: [Selector; 3] = [
    Selector::Id("id_trade"),
    Selector::Name("trade"),
    Selector::NameSuffix("trade"),
];

/// Candidates for the primary (paper-type) field. Two naming conventions
/// exist for it, each with its own id/name pair.
const PRIMARY_CANDIDATES: [Selector; 5] = [
    Selector::Id("id_question_paper"),
    Selector::Name("question_paper"),
    Selector::NameSuffix("question_paper"),
    Selector::Id("id_paper_type"),
    Selector::Name("paper_type"),
];

/// One selector strategy evaluated against a control's attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selector {
    /// Exact element-id match.
    Id(&'static str),
    /// Exact element-name match.
    Name(&'static str),
    /// Element-name suffix match.
    NameSuffix(&'static str),
    /// Selects only, constrained by an id prefix and a name suffix.
    SelectIdPrefixNameSuffix {
        /// Required element-id prefix.
        id_prefix: &'static str,
        /// Required element-name suffix.
        name_suffix: &'static str,
    },
}

impl Selector {
    /// Whether a control satisfies this strategy.
    fn matches(self, control: &Control) -> bool {
        return match self {
            Selector::Id(id) => !control.id.is_empty() && control.id == id,
            Selector::Name(name) => !control.name.is_empty() && control.name == name,
            Selector::NameSuffix(suffix) => {
                !control.name.is_empty() && control.name.ends_with(suffix)
            },
            Selector::SelectIdPrefixNameSuffix { id_prefix, name_suffix } => {
                control.kind == FieldKind::Select
                    && control.id.starts_with(id_prefix)
                    && control.name.ends_with(name_suffix)
            },
        };
    }
}

/// Resolve a field role within a scope: the first candidate strategy with a
/// match wins. Returns `None` when nothing matches, which downstream logic
/// treats as "feature absent for this scope".
pub(crate) fn resolve(page: &Page, scope: ScopeId, role: FieldRole) -> Option<ControlId> {
    let candidates: &[Selector] = match role {
        FieldRole::Assignment => &ASSIGNMENT_CANDIDATES,
        FieldRole::Dependent => &DEPENDENT_CANDIDATES,
        FieldRole::Primary => &PRIMARY_CANDIDATES,
    };

    for candidate in candidates {
        let found = page
            .controls_in(scope)
            .find(|(_, control)| return candidate.matches(*control));
        if let Some((id, _)) = found {
            return Some(id);
        }
    }
    return None;
}
