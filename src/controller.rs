//! The control loop: scope binding, change dispatch, deferred syncs,
//! lookup replies, and delayed document re-scans.
//!
//! Everything here runs on the caller's thread. Change dispatch is
//! synchronous and re-entrant, exactly like the change events it models:
//! clearing the dependent field from inside a toggle immediately runs the
//! dependent's own change handler, which is what resets the assignment
//! field before any request can fire. Only three things cross turns: the
//! deferred sync queue, re-scan timers, and lookup replies — all drained
//! by `pump`.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::lookup::{LookupClient, LookupReply, Ticket};
use crate::page::Page;
use crate::selector;
use crate::sync;
use crate::toggle;
use crate::types::{ControlId, FieldRole, ScopeId};

/// Namespace tag for the dependent field's sync binding.
const NS_SYNC: &str = "formlink-sync";

/// Namespace tag for the primary field's toggle binding.
const NS_TOGGLE: &str = "formlink-toggle";

/// Interval `settle` blocks on the reply channel between drains.
const SETTLE_POLL: Duration = Duration::from_millis(10);

/// What a bound change handler runs.
#[derive(Debug, Clone, Copy)]
enum Action {
    /// Dependent changed: sync immediately.
    SyncNow {
        /// The dependent field of this scope.
        dependent: ControlId,
        /// The primary field of this scope.
        primary: ControlId,
    },
    /// Primary changed: toggle now, then sync on the next pump turn so the
    /// toggle's mutations are observable by the sync.
    ToggleThenSync {
        /// The dependent field of this scope.
        dependent: ControlId,
        /// The primary field of this scope.
        primary: ControlId,
    },
}

/// One registered change binding.
#[derive(Debug, Clone, Copy)]
struct Binding {
    /// What to run when the control's change fires.
    action: Action,
    /// Control whose change event runs this binding.
    control: ControlId,
    /// Tag for idempotent removal on re-bind.
    namespace: &'static str,
    /// Scope the binding was created for.
    scope: ScopeId,
}

/// A sync postponed to the next pump turn.
#[derive(Debug, Clone, Copy)]
struct DeferredSync {
    /// The dependent field of the scope.
    dependent: ControlId,
    /// The primary field of the scope.
    primary: ControlId,
    /// Scope to resolve the assignment field in.
    scope: ScopeId,
}

/// The linked-field controller. Owns the page, the handler registry, and
/// the in-flight lookup table.
pub struct FormLink<C: LookupClient> {
    /// Active change bindings, at most one toggle and one sync binding per
    /// bound scope.
    bindings: Vec<Binding>,
    /// Lookup client submissions go through.
    client: C,
    /// Syncs waiting for the next pump turn.
    deferred: VecDeque<DeferredSync>,
    /// Assignment field each outstanding ticket will land on.
    in_flight: HashMap<Ticket, ControlId>,
    /// Next ticket to issue.
    next_ticket: Ticket,
    /// Tunables fixed at attach time.
    options: Options,
    /// The headless page this controller drives.
    page: Page,
    /// Receiving side of the lookup reply channel.
    reply_rx: Receiver<LookupReply>,
    /// Sending side, cloned into every submission.
    reply_tx: Sender<LookupReply>,
    /// Fixed-delay timers started by add-row clicks.
    rescan_timers: Vec<Receiver<Instant>>,
}

impl<C: LookupClient> FormLink<C> {
    /// Attach to a page with default options: bind the document scope and
    /// run the initialization pass.
    pub fn attach(page: Page, client: C) -> Self {
        return Self::attach_with(page, client, Options::default());
    }

    /// Attach with explicit options.
    pub fn attach_with(page: Page, client: C, options: Options) -> Self {
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
        let mut link = Self {
            bindings: Vec::new(),
            client,
            deferred: VecDeque::new(),
            in_flight: HashMap::new(),
            next_ticket: 0,
            options,
            page,
            reply_rx,
            reply_tx,
            rescan_timers: Vec::new(),
        };
        link.bind(ScopeId::DOCUMENT);
        return link;
    }

    /// The page, for reads.
    pub fn page(&self) -> &Page {
        return &self.page;
    }

    /// The page, for embedder mutations (inserting row controls, setting
    /// widget hooks). Mutations made here fire no change events; use
    /// `edit` or `fire_change` for those.
    pub fn page_mut(&mut self) -> &mut Page {
        return &mut self.page;
    }

    /// A user edit: set the control's value, then dispatch its change
    /// event. The synchronous part of the cascade (toggle, immediate
    /// syncs, resets) completes before this returns; deferred syncs wait
    /// for `pump`.
    pub fn edit(&mut self, control: ControlId, value: &str) {
        self.page.set_value(control, value);
        self.dispatch_change(control);
    }

    /// Dispatch a change event without mutating the value first.
    pub fn fire_change(&mut self, control: ControlId) {
        self.dispatch_change(control);
    }

    /// Typed row-insertion notification: bind the freshly inserted row as
    /// its own scope. Idempotent per scope.
    pub fn row_inserted(&mut self, scope: ScopeId, formset_name: &str) {
        tracing::debug!(formset = formset_name, ?scope, "row inserted, binding scope");
        self.bind(scope);
    }

    /// An add-row control was clicked (`.add-row`, its inner anchor, or a
    /// grappelli add handler on the original form). The new row does not
    /// exist yet at click time, so this starts a fixed-delay timer; when
    /// it fires, `pump` re-binds the whole document scope. A heuristic,
    /// not a synchronization signal — rows appearing later than the delay
    /// are picked up by the next click or by `row_inserted`.
    pub fn add_row_clicked(&mut self) {
        self.rescan_timers
            .push(crossbeam_channel::after(self.options.rescan_delay));
    }

    /// Drain everything currently ready: deferred syncs first, then fired
    /// re-scan timers, then arrived lookup replies, until nothing is
    /// ready. Replies are applied in arrival order; when rapid edits race,
    /// the last reply to arrive wins.
    pub fn pump(&mut self) {
        loop {
            if let Some(job) = self.deferred.pop_front() {
                self.run_sync(job.scope, Some(job.primary), Some(job.dependent));
                continue;
            }
            if self.take_fired_rescan() {
                self.bind(ScopeId::DOCUMENT);
                continue;
            }
            match self.reply_rx.try_recv() {
                Ok(reply) => {
                    self.apply_reply(reply);
                    continue;
                },
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => {},
            }
            return;
        }
    }

    /// Block until the deferred queue, re-scan timers, and in-flight
    /// lookups are all drained, or the timeout passes. Returns whether
    /// everything settled. Meant for embedders driving a real client;
    /// tests with a scripted client use `pump`.
    pub fn settle(&mut self, timeout: Duration) -> bool {
        let start = Instant::now();
        loop {
            self.pump();
            if self.deferred.is_empty()
                && self.in_flight.is_empty()
                && self.rescan_timers.is_empty()
            {
                return true;
            }
            if start.elapsed() >= timeout {
                return false;
            }
            if let Ok(reply) = self.reply_rx.recv_timeout(SETTLE_POLL) {
                self.apply_reply(reply);
            }
        }
    }

    /// Number of lookups submitted but not yet answered.
    pub fn pending_lookups(&self) -> usize {
        return self.in_flight.len();
    }

    /// Bind (or re-bind) one scope. Resolves the primary and dependent
    /// fields; if either is absent the scope has no linked fields and
    /// nothing happens. Otherwise old bindings for this scope are dropped
    /// before fresh ones attach — re-binding never doubles handlers — and
    /// the initialization pass runs so the scope starts consistent without
    /// user interaction.
    fn bind(&mut self, scope: ScopeId) {
        let primary = selector::resolve(&self.page, scope, FieldRole::Primary);
        let dependent = selector::resolve(&self.page, scope, FieldRole::Dependent);
        let (Some(primary), Some(dependent)) = (primary, dependent) else {
            tracing::debug!(?scope, "no linked fields in scope, skipping bind");
            return;
        };

        self.bindings.retain(|binding| return binding.scope != scope);
        self.bindings.push(Binding {
            action: Action::ToggleThenSync { dependent, primary },
            control: primary,
            namespace: NS_TOGGLE,
            scope,
        });
        self.bindings.push(Binding {
            action: Action::SyncNow { dependent, primary },
            control: dependent,
            namespace: NS_SYNC,
            scope,
        });
        tracing::debug!(?scope, ?primary, ?dependent, "scope bound");

        // Initialization pass: current primary value first, then one sync.
        let value = self.page.value(primary).to_string();
        self.run_toggle(&value, dependent);
        self.run_sync(scope, Some(primary), Some(dependent));
    }

    /// Synchronous, re-entrant change dispatch. The matching bindings are
    /// snapshotted first because handlers may re-enter and re-bind.
    fn dispatch_change(&mut self, control: ControlId) {
        let matched: Vec<Binding> = self
            .bindings
            .iter()
            .filter(|binding| return binding.control == control)
            .copied()
            .collect();

        for binding in matched {
            match binding.action {
                Action::SyncNow { dependent, primary } => {
                    self.run_sync(binding.scope, Some(primary), Some(dependent));
                },
                Action::ToggleThenSync { dependent, primary } => {
                    let value = self.page.value(primary).to_string();
                    self.run_toggle(&value, dependent);
                    self.deferred.push_back(DeferredSync {
                        dependent,
                        primary,
                        scope: binding.scope,
                    });
                },
            }
        }
    }

    /// Run the toggle engine, cascading the dependent's change event when
    /// the clear went through the notifying path.
    fn run_toggle(&mut self, primary_value: &str, dependent: ControlId) {
        match toggle::toggle(&mut self.page, primary_value, Some(dependent)) {
            toggle::ToggleEffect::ClearedWithNotice(cleared) => {
                self.dispatch_change(cleared);
            },
            toggle::ToggleEffect::Quiet => {},
        }
    }

    /// Run one sync: plan it, then either dispatch the reset's change
    /// event or submit the lookup.
    fn run_sync(
        &mut self,
        scope: ScopeId,
        primary: Option<ControlId>,
        dependent: Option<ControlId>,
    ) {
        match sync::plan(&mut self.page, scope, primary, dependent) {
            sync::SyncDecision::Inactive => {},
            sync::SyncDecision::Submit { assignment, query } => {
                let ticket = self.next_ticket;
                self.next_ticket = self.next_ticket.wrapping_add(1);
                self.in_flight.insert(ticket, assignment);
                tracing::debug!(
                    ticket,
                    trade_id = %query.trade_id,
                    paper_type = %query.paper_type,
                    "submitting lookup"
                );
                self.client.submit(ticket, query, self.reply_tx.clone());
            },
            sync::SyncDecision::WasReset(assignment) => {
                self.dispatch_change(assignment);
            },
        }
    }

    /// Land one lookup reply on its assignment field. A failed lookup
    /// leaves the field exactly as it was — the log entry is the only
    /// trace. No staleness check: replies land in arrival order and the
    /// last one wins, matching the form's observed behavior.
    fn apply_reply(&mut self, reply: LookupReply) {
        let Some(assignment) = self.in_flight.remove(&reply.ticket) else {
            tracing::debug!(ticket = reply.ticket, "reply for unknown ticket, dropping");
            return;
        };
        match reply.outcome {
            Err(error) => {
                tracing::error!(
                    trade_id = %reply.query.trade_id,
                    %error,
                    "lookup failed, leaving assignment field untouched"
                );
            },
            Ok(response) => {
                if sync::apply_response(&mut self.page, assignment, &response) {
                    self.dispatch_change(assignment);
                }
            },
        }
    }

    /// Consume fired re-scan timers. Several timers firing together
    /// collapse into one re-bind — binding is idempotent, so repeats
    /// would be no-ops anyway.
    fn take_fired_rescan(&mut self) -> bool {
        let mut fired = false;
        self.rescan_timers.retain(|timer| {
            return match timer.try_recv() {
                Ok(_) => {
                    fired = true;
                    false
                },
                Err(TryRecvError::Empty) => true,
                Err(TryRecvError::Disconnected) => false,
            };
        });
        return fired;
    }
}

/// Tunables for `FormLink::attach_with`.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Delay between an add-row click and the document re-scan.
    pub rescan_delay: Duration,
}

impl Default for Options {
    /// The form's historical 200 ms add-row delay.
    fn default() -> Self {
        return Self {
            rescan_delay: Duration::from_millis(200),
        };
    }
}
