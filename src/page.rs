//! Headless form page: scopes, controls, and widget hooks.
//!
//! The page stands in for the DOM subtree the original admin form lives in.
//! It knows nothing about linking behavior — it stores controls, answers
//! scoped queries, and mutates values and option lists. Change *dispatch*
//! belongs to the controller, which owns the handler registry.

use std::collections::HashMap;

use crate::error::Error;
use crate::types::{ControlId, FieldKind, OptionEntry, ScopeId};

/// A single form control on the page.
#[derive(Debug, Clone)]
pub struct Control {
    /// Disabled flag. Disabled dependents short-circuit the sync chain.
    pub disabled: bool,
    /// Element id attribute; empty when the control has none.
    pub id: String,
    /// Control kind: select or plain text input.
    pub kind: FieldKind,
    /// Element name attribute; empty when the control has none.
    pub name: String,
    /// Current option list. Meaningful for selects only.
    pub options: Vec<OptionEntry>,
    /// Current value.
    pub value: String,
}

impl Control {
    /// A select control with the given id and name attributes.
    pub fn select(id: impl Into<String>, name: impl Into<String>) -> Self {
        return Self {
            disabled: false,
            id: id.into(),
            kind: FieldKind::Select,
            name: name.into(),
            options: Vec::new(),
            value: String::new(),
        };
    }

    /// A text input with the given id and name attributes.
    pub fn text(id: impl Into<String>, name: impl Into<String>) -> Self {
        return Self {
            kind: FieldKind::Text,
            ..Self::select(id, name)
        };
    }

    /// Builder-style: replace the option list.
    #[must_use]
    pub fn with_options(mut self, options: Vec<OptionEntry>) -> Self {
        self.options = options;
        return self;
    }

    /// Builder-style: set the current value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        return self;
    }

    /// The identifier used in diagnostics: element id when present,
    /// element name otherwise.
    pub fn label(&self) -> &str {
        if self.id.is_empty() {
            return &self.name;
        }
        return &self.id;
    }
}

/// The headless page. Scope 0 is the document; every inserted formset row
/// gets a fresh scope from `add_scope`. The document scope contains every
/// control (rows are subtrees of the document); a row scope contains only
/// its own controls.
pub struct Page {
    /// Controls in insertion order, each tagged with its owning scope.
    /// `ControlId` indexes into this list.
    controls: Vec<Slot>,
    /// Enhancement-layer hooks, keyed by control. A hook observes notifying
    /// value mutations and may reject them.
    hooks: HashMap<ControlId, WidgetHook>,
    /// Number of scopes allocated so far; scope 0 is the document.
    scope_count: usize,
}

impl Page {
    /// An empty page with only the document scope.
    pub fn new() -> Self {
        return Self {
            controls: Vec::new(),
            hooks: HashMap::new(),
            scope_count: 1,
        };
    }

    /// Allocate a scope for a newly inserted form row.
    pub fn add_scope(&mut self) -> ScopeId {
        let scope = ScopeId(self.scope_count);
        self.scope_count = self.scope_count.saturating_add(1);
        return scope;
    }

    /// Add a control to a scope. Document-level controls go to
    /// `ScopeId::DOCUMENT`; row controls to the id from `add_scope`.
    pub fn add_control(&mut self, scope: ScopeId, control: Control) -> ControlId {
        let id = ControlId(self.controls.len());
        self.controls.push(Slot { control, scope });
        return id;
    }

    /// Look up a control. `None` for an id this page never issued —
    /// callers treat that the same as an unresolved field.
    pub fn control(&self, id: ControlId) -> Option<&Control> {
        return self.controls.get(id.0).map(|slot| return &slot.control);
    }

    /// Mutable control access for embedders.
    pub fn control_mut(&mut self, id: ControlId) -> Option<&mut Control> {
        return self.controls.get_mut(id.0).map(|slot| return &mut slot.control);
    }

    /// Controls contained in a scope, in page insertion order. The document
    /// scope yields everything; a row scope yields only its own controls.
    pub fn controls_in(
        &self,
        scope: ScopeId,
    ) -> impl Iterator<Item = (ControlId, &Control)> {
        return self
            .controls
            .iter()
            .enumerate()
            .filter(move |(_, slot)| {
                return scope == ScopeId::DOCUMENT || slot.scope == scope;
            })
            .map(|(index, slot)| return (ControlId(index), &slot.control));
    }

    /// Current value of a control; empty string for an unknown id.
    pub fn value(&self, id: ControlId) -> &str {
        return self.control(id).map_or("", |control| return control.value.as_str());
    }

    /// Disabled flag of a control; false for an unknown id.
    pub fn is_disabled(&self, id: ControlId) -> bool {
        return self.control(id).is_some_and(|control| return control.disabled);
    }

    /// Current option list of a control; empty for an unknown id.
    pub fn options(&self, id: ControlId) -> &[OptionEntry] {
        return self.control(id).map_or(&[], |control| return control.options.as_slice());
    }

    /// Set a control's value without any notification.
    pub fn set_value(&mut self, id: ControlId, value: impl Into<String>) {
        if let Some(control) = self.control_mut(id) {
            control.value = value.into();
        }
    }

    /// Set a control's disabled flag.
    pub fn set_disabled(&mut self, id: ControlId, disabled: bool) {
        if let Some(control) = self.control_mut(id) {
            control.disabled = disabled;
        }
    }

    /// Replace a control's option list.
    pub fn set_options(&mut self, id: ControlId, options: Vec<OptionEntry>) {
        if let Some(control) = self.control_mut(id) {
            control.options = options;
        }
    }

    /// Append one option to a control's list.
    pub fn push_option(&mut self, id: ControlId, option: OptionEntry) {
        if let Some(control) = self.control_mut(id) {
            control.options.push(option);
        }
    }

    /// Register an enhancement-layer hook for a control. The hook runs on
    /// every notifying value mutation with the control's new value and may
    /// reject the notification.
    pub fn set_widget_hook(&mut self, id: ControlId, hook: WidgetHook) {
        self.hooks.insert(id, hook);
    }

    /// Run a control's widget hook with its current value, if one is
    /// registered. A hook rejection becomes `Error::MutationRejected`.
    ///
    /// # Errors
    ///
    /// Returns `Error::MutationRejected` when the hook refuses the mutation.
    pub(crate) fn notify_widget(&mut self, id: ControlId) -> Result<(), Error> {
        let value = self.value(id).to_string();
        let field = self
            .control(id)
            .map_or_else(String::new, |control| return control.label().to_string());
        let Some(hook) = self.hooks.get_mut(&id) else {
            return Ok(());
        };
        return hook(&value).map_err(|reason| {
            return Error::MutationRejected { field, reason };
        });
    }
}

impl Default for Page {
    /// Same as `Page::new`.
    fn default() -> Self {
        return Self::new();
    }
}

/// A control plus the scope that contains it.
#[derive(Debug, Clone)]
struct Slot {
    /// The control itself.
    control: Control,
    /// Owning scope; `ScopeId::DOCUMENT` for top-level form controls.
    scope: ScopeId,
}

/// Enhancement-layer callback observing notifying value mutations.
/// Stands in for a rich select widget (Select2-style) that listens on
/// change rather than on attribute mutation. Returning `Err` rejects the
/// notification; callers fall back to a plain mutation.
pub type WidgetHook = Box<dyn FnMut(&str) -> Result<(), String> + Send>;
