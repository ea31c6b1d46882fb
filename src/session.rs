//! Record correlation for one discovery pass
//!
//! PTR answers and A records for the same device may arrive in one packet or
//! spread over several, in any order. The session keeps the latest value of
//! each until both are known, then emits a [`Candidate`].

use crate::protocol::{MdnsRecord, MdnsResponse};
use crate::types::Candidate;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, Ordering};

/// Transient correlation state for a single discovery pass
#[derive(Debug)]
pub struct DiscoverySession {
    service_name: String,
    pending_id: Option<String>,
    pending_address: Option<Ipv4Addr>,
    emitted: HashSet<Candidate>,
    bound: AtomicBool,
}

impl DiscoverySession {
    /// Create a session filtering PTR answers on `service_name`
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into().trim_end_matches('.').to_string(),
            pending_id: None,
            pending_address: None,
            emitted: HashSet::new(),
            bound: AtomicBool::new(false),
        }
    }

    /// Instance label seen so far, if any
    pub fn pending_id(&self) -> Option<&str> {
        self.pending_id.as_deref()
    }

    /// Address seen so far, if any
    pub fn pending_address(&self) -> Option<Ipv4Addr> {
        self.pending_address
    }

    /// Whether a device has already been bound in this session
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::Acquire)
    }

    /// Claim the right to bind
    ///
    /// Returns `true` for exactly one caller per session; every later call,
    /// from any thread, returns `false`.
    pub fn try_claim(&self) -> bool {
        self.bound
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Apply one answer-section record
    pub fn on_answer(&mut self, record: &MdnsRecord) {
        if let MdnsRecord::Ptr { name, data } = record {
            if !data.is_empty() && name.eq_ignore_ascii_case(&self.service_name) {
                let id = data.split('.').next().unwrap_or(data);
                tracing::debug!("PTR answer for instance {}", id);
                self.pending_id = Some(id.to_string());
            }
        }
    }

    /// Apply one additional-section record
    pub fn on_additional(&mut self, record: &MdnsRecord) {
        if let MdnsRecord::A { name, address } = record {
            tracing::debug!("A record {} -> {}", name, address);
            self.pending_address = Some(*address);
        }
    }

    /// Fold a whole response into the session
    ///
    /// Returns a candidate when both halves are known and the pair has not
    /// been emitted before in this session. Inert once bound.
    pub fn on_response(&mut self, response: &MdnsResponse) -> Option<Candidate> {
        if self.is_bound() {
            return None;
        }

        for record in &response.answers {
            self.on_answer(record);
        }
        for record in &response.additionals {
            self.on_additional(record);
        }

        let candidate = Candidate {
            instance: self.pending_id.clone()?,
            ip_address: self.pending_address?,
        };

        if !self.emitted.insert(candidate.clone()) {
            return None;
        }

        Some(candidate)
    }
}
