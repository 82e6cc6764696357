/// Core domain types for scopes, controls, and lookup queries.

/// Identifies one form control within a `Page`.
/// Issued by `Page::add_control` and stable for the life of the page —
/// controls are never removed, they only go stale with the scope they
/// belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ControlId(pub(crate) usize);

/// What kind of form control a `Control` models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A select with an option list. Clears go through the notifying
    /// path so enhancement layers observe them.
    Select,
    /// A plain text input. Clears never notify.
    Text,
}

/// Role of a field in the linked trio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// The assignment selector repopulated from the lookup endpoint.
    Assignment,
    /// The trade selector disabled and cleared by the primary value.
    Dependent,
    /// The paper-type selector whose value drives the toggle.
    Primary,
}

/// Query parameters for one lookup request. Built fresh each time a sync
/// decides to hit the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    /// Current value of the primary field; empty when the primary is
    /// unresolved in the scope.
    pub paper_type: String,
    /// Selected value of the dependent field.
    pub trade_id: String,
}

/// A `{value, text}` pair in a select's option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionEntry {
    /// Visible option label.
    pub text: String,
    /// Submitted option value.
    pub value: String,
}

impl OptionEntry {
    /// Build an option from a value and a label.
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        return Self {
            text: text.into(),
            value: value.into(),
        };
    }

    /// The blank "none selected" option that heads every assignment list.
    pub fn placeholder() -> Self {
        return Self::new("", PLACEHOLDER_TEXT);
    }
}

/// Label of the blank placeholder option (the admin site's empty choice).
pub const PLACEHOLDER_TEXT: &str = "---------";

/// Identifies one scope within a `Page`: the document itself, or a single
/// dynamically inserted form row. Scopes are never destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) usize);

impl ScopeId {
    /// The whole-document scope. Contains every control on the page,
    /// including controls that belong to inserted rows.
    pub const DOCUMENT: Self = Self(0);
}
