//! Request and reply messages.
//!
//! The transport layer owns request delivery and reply routing; these types
//! define the field surface the engine reads and the allow-listed projection
//! used when a request is forwarded to a peer.

use crate::domain::errors::EngineError;
use canopy_tree::{Element, TreeDelta};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use uuid::Uuid;

/// Per-call option bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallOptions(u32);

impl CallOptions {
    pub const NONE: CallOptions = CallOptions(0);
    /// Reply routing hint for the transport layer.
    pub const DISCARD_REPLY: CallOptions = CallOptions(0x0010);
    /// The request is a forced global update; an id collision under this
    /// flag indicates replica divergence rather than an authoring mistake.
    pub const FORCE_DIFF: CallOptions = CallOptions(0x0100);
    /// Caller blocks for the result.
    pub const SYNC_CALL: CallOptions = CallOptions(0x1000);

    pub fn contains(self, other: CallOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: CallOptions) {
        self.0 |= other.0;
    }
}

impl BitOr for CallOptions {
    type Output = CallOptions;

    fn bitor(self, rhs: CallOptions) -> CallOptions {
        CallOptions(self.0 | rhs.0)
    }
}

/// Operand payload carried by a request: either a document fragment or a
/// structural delta, depending on the operation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CallPayload {
    Fragment(Element),
    Delta(TreeDelta),
}

/// An inbound operation request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Request {
    pub request_id: Uuid,
    /// Null resolves to the default registry entry, not to failure.
    pub operation: Option<String>,
    pub call_options: CallOptions,
    pub section: Option<String>,
    /// Generic operand field; may be wrapped in a `fragment` envelope tag.
    pub call_data: Option<CallPayload>,
    /// Dedicated channel for the global-update diff.
    pub update_diff: Option<TreeDelta>,
    /// True when a primary is pushing its committed state to replicas.
    pub global_update: bool,
    pub client_id: Option<String>,
    pub call_id: Option<u64>,
    pub host: Option<String>,
    pub is_reply: bool,
}

impl Request {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            operation: Some(operation.into()),
            call_options: CallOptions::NONE,
            section: None,
            call_data: None,
            update_diff: None,
            global_update: false,
            client_id: None,
            call_id: None,
            host: None,
            is_reply: false,
        }
    }

    #[must_use]
    pub fn with_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    #[must_use]
    pub fn with_fragment(mut self, fragment: Element) -> Self {
        self.call_data = Some(CallPayload::Fragment(fragment));
        self
    }

    #[must_use]
    pub fn with_delta(mut self, delta: TreeDelta) -> Self {
        self.call_data = Some(CallPayload::Delta(delta));
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.call_options = options;
        self
    }

    #[must_use]
    pub fn as_global_update(mut self, diff: TreeDelta) -> Self {
        self.global_update = true;
        self.update_diff = Some(diff);
        self.call_options.insert(CallOptions::FORCE_DIFF);
        self
    }

    /// Allow-listed copy for forwarding to a peer.
    ///
    /// Scalar routing and bookkeeping fields are always kept; the operand
    /// payload fields travel only when `with_data` is set.
    pub fn forward_copy(&self, with_data: bool) -> Request {
        Request {
            request_id: self.request_id,
            operation: self.operation.clone(),
            call_options: self.call_options,
            section: self.section.clone(),
            call_data: if with_data { self.call_data.clone() } else { None },
            update_diff: if with_data { self.update_diff.clone() } else { None },
            global_update: self.global_update,
            client_id: self.client_id.clone(),
            call_id: self.call_id,
            host: self.host.clone(),
            is_reply: self.is_reply,
        }
    }
}

/// Wire status carried on every reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCode {
    Ok,
    OperationNotFound,
    InvalidSection,
    IdCollision,
    NoInput,
    NotFound,
    ExistsAlready,
    DeltaMismatch,
    NotPrimary,
    MalformedInput,
}

impl From<&EngineError> for StatusCode {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::OperationNotFound { .. } => StatusCode::OperationNotFound,
            EngineError::InvalidSection { .. } => StatusCode::InvalidSection,
            EngineError::IdCollision { .. } => StatusCode::IdCollision,
            EngineError::NoInput => StatusCode::NoInput,
            EngineError::NotFound => StatusCode::NotFound,
            EngineError::ExistsAlready { .. } => StatusCode::ExistsAlready,
            EngineError::DeltaMismatch { .. } => StatusCode::DeltaMismatch,
            EngineError::NotPrimary => StatusCode::NotPrimary,
            EngineError::MalformedInput { .. } => StatusCode::MalformedInput,
        }
    }
}

/// The engine's answer to one request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Reply {
    pub request_id: Uuid,
    pub call_id: Option<u64>,
    pub client_id: Option<String>,
    pub rc: StatusCode,
    pub output: Option<Element>,
    pub config_changed: bool,
    pub is_reply: bool,
}

impl Reply {
    pub fn success(request: &Request, output: Option<Element>, config_changed: bool) -> Reply {
        Reply {
            request_id: request.request_id,
            call_id: request.call_id,
            client_id: request.client_id.clone(),
            rc: StatusCode::Ok,
            output,
            config_changed,
            is_reply: true,
        }
    }

    pub fn failure(request: &Request, rc: StatusCode) -> Reply {
        Reply {
            request_id: request.request_id,
            call_id: request.call_id,
            client_id: request.client_id.clone(),
            rc,
            output: None,
            config_changed: false,
            is_reply: true,
        }
    }
}
