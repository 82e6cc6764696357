//! Lookup endpoint: wire contract, response classification, and clients.
//!
//! The endpoint is an opaque admin view answering
//! `GET <endpoint>?trade_id=<id>&paper_type=<value>` with JSON. Two shapes
//! are recognized; everything else is a no-match. Transport failures are
//! errors — the caller leaves the assignment field untouched for those.

use crossbeam_channel::Sender;

use crate::error::Error;
use crate::types::{LookupQuery, OptionEntry};

/// Endpoint path the admin site serves the lookup view on.
pub const DEFAULT_ENDPOINT: &str = "/admin/questions/questionpaper/qp-for-trade/";

/// Blocking-HTTP lookup client. Each submission runs on its own worker
/// thread and delivers its reply over the controller's channel, so the
/// control loop never blocks on the network. No retries; the default
/// client timeout stands.
#[derive(Debug, Clone)]
pub struct HttpLookup {
    /// Shared blocking HTTP client.
    agent: reqwest::blocking::Client,
    /// Full endpoint URL.
    endpoint: String,
}

impl HttpLookup {
    /// A client against the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        return Self {
            agent: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
        };
    }
}

impl LookupClient for HttpLookup {
    /// Spawn the GET on a worker thread. The reply send is allowed to fail:
    /// a dropped receiver just means the controller is gone.
    fn submit(&self, ticket: Ticket, query: LookupQuery, reply: Sender<LookupReply>) {
        let agent = self.agent.clone();
        let endpoint = self.endpoint.clone();
        std::thread::spawn(move || {
            let outcome = fetch(&agent, &endpoint, &query);
            let _ = reply.send(LookupReply { outcome, query, ticket });
        });
    }
}

/// How a lookup is reached. The controller submits with a ticket and a
/// reply channel; implementations answer asynchronously. The bundled
/// implementation is `HttpLookup`; tests script their own.
pub trait LookupClient {
    /// Begin one lookup. Must not block the caller. The reply must
    /// eventually be sent on `reply` unless the receiving side is gone.
    fn submit(&self, ticket: Ticket, query: LookupQuery, reply: Sender<LookupReply>);
}

/// Outcome of one submitted lookup, delivered back to the control loop.
#[derive(Debug)]
pub struct LookupReply {
    /// The classified response, or the transport/status failure.
    pub outcome: Result<LookupResponse, Error>,
    /// The query that was submitted, kept for the failure log.
    pub query: LookupQuery,
    /// Ticket issued at submission; pairs the reply with its target field.
    pub ticket: Ticket,
}

/// A successful lookup body, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupResponse {
    /// `{"results": [{id, text}, …]}` — append every entry in order,
    /// select nothing.
    Many(Vec<OptionEntry>),
    /// Anything unrecognized, negative, or empty — placeholder only.
    NoMatch,
    /// `{"ok": true, "qp": {id, label}}` — append the one option and
    /// select it.
    Single(OptionEntry),
}

/// Monotonic id for a submitted lookup.
pub type Ticket = u64;

/// Classify a response body. Recognition mirrors the endpoint contract:
/// a truthy `ok` with a `qp` object wins, then a non-empty `results`
/// array; any other shape — including a body that fails to parse into
/// either — is a no-match.
pub fn classify_body(body: serde_json::Value) -> LookupResponse {
    let Ok(wire) = serde_json::from_value::<WireBody>(body) else {
        return LookupResponse::NoMatch;
    };

    if wire.ok && let Some(single) = wire.qp {
        return LookupResponse::Single(OptionEntry::new(
            wire_id_string(&single.id),
            single.label,
        ));
    }

    if let Some(results) = wire.results
        && !results.is_empty()
    {
        let entries = results
            .into_iter()
            .map(|entry| return OptionEntry::new(wire_id_string(&entry.id), entry.text))
            .collect();
        return LookupResponse::Many(entries);
    }

    return LookupResponse::NoMatch;
}

/// Perform the GET and classify the body.
///
/// # Errors
///
/// Returns `Error::LookupTransport` for request failures and
/// `Error::LookupStatus` for non-success statuses. A success body that is
/// not valid JSON classifies as no-match rather than erroring — the
/// endpoint answered, it just had nothing.
fn fetch(
    agent: &reqwest::blocking::Client,
    endpoint: &str,
    query: &LookupQuery,
) -> Result<LookupResponse, Error> {
    let response = agent
        .get(endpoint)
        .query(&[
            ("trade_id", query.trade_id.as_str()),
            ("paper_type", query.paper_type.as_str()),
        ])
        .send()?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::LookupStatus { status: status.as_u16() });
    }

    return match response.json::<serde_json::Value>() {
        Ok(body) => Ok(classify_body(body)),
        Err(_) => Ok(LookupResponse::NoMatch),
    };
}

/// Option values come back as JSON numbers or strings; both normalize to
/// the string form a select value holds.
fn wire_id_string(id: &serde_json::Value) -> String {
    return match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
}

/// Raw wire body. Both recognized shapes live in one struct so the
/// classification checks read like the endpoint contract.
#[derive(Debug, serde::Deserialize)]
struct WireBody {
    /// Success marker of the single-item shape.
    #[serde(default)]
    ok: bool,
    /// Single-item payload.
    #[serde(default)]
    qp: Option<WireSingle>,
    /// List-shape payload.
    #[serde(default)]
    results: Option<Vec<WireEntry>>,
}

/// One entry of the list shape.
#[derive(Debug, serde::Deserialize)]
struct WireEntry {
    /// Option value; number or string.
    id: serde_json::Value,
    /// Option label.
    text: String,
}

/// Payload of the single-item shape.
#[derive(Debug, serde::Deserialize)]
struct WireSingle {
    /// Option value; number or string.
    id: serde_json::Value,
    /// Option label.
    label: String,
}
