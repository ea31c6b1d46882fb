//! mDNS wire handling
//!
//! Only the two record types discovery consumes are surfaced: PTR (service
//! type to instance name) and A (host to IPv4 address). Everything else in a
//! response is dropped during decoding.

use crate::error::Result;
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{Name, RData, Record, RecordType};
use std::net::Ipv4Addr;

/// mDNS IPv4 multicast group
pub const MDNS_ADDR: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 251);

/// mDNS port
pub const MDNS_PORT: u16 = 5353;

/// A decoded resource record relevant to discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MdnsRecord {
    /// Pointer from a service type to an instance name
    Ptr {
        /// Owner name, without the trailing dot
        name: String,
        /// Target instance name, empty if the record carried no data
        data: String,
    },

    /// IPv4 address record
    A {
        name: String,
        address: Ipv4Addr,
    },
}

/// The discovery-relevant sections of an mDNS response packet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MdnsResponse {
    pub answers: Vec<MdnsRecord>,
    pub additionals: Vec<MdnsRecord>,
}

impl MdnsResponse {
    /// Response with the given answer records
    pub fn with_answers(mut self, answers: impl IntoIterator<Item = MdnsRecord>) -> Self {
        self.answers.extend(answers);
        self
    }

    /// Response with the given additional records
    pub fn with_additionals(mut self, additionals: impl IntoIterator<Item = MdnsRecord>) -> Self {
        self.additionals.extend(additionals);
        self
    }
}

/// Encode a one-shot PTR question for `service_name`
pub fn encode_query(service_name: &str) -> Result<Vec<u8>> {
    let name = Name::from_ascii(format!("{}.", trim_dot(service_name)))?;

    let mut message = Message::new();
    message
        .set_id(0)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(false);
    message.add_query(Query::query(name, RecordType::PTR));

    Ok(message.to_vec()?)
}

/// Decode a packet from the multicast group
///
/// Returns `Ok(None)` for queries (including our own, looped back).
pub fn decode_response(packet: &[u8]) -> Result<Option<MdnsResponse>> {
    let message = Message::from_vec(packet)?;

    if message.message_type() != MessageType::Response {
        return Ok(None);
    }

    Ok(Some(MdnsResponse {
        answers: message.answers().iter().filter_map(convert_record).collect(),
        additionals: message.additionals().iter().filter_map(convert_record).collect(),
    }))
}

fn convert_record(record: &Record) -> Option<MdnsRecord> {
    let name = trim_dot(&record.name().to_utf8()).to_string();

    match record.data() {
        RData::PTR(ptr) => Some(MdnsRecord::Ptr {
            name,
            data: trim_dot(&ptr.0.to_utf8()).to_string(),
        }),
        RData::A(a) => Some(MdnsRecord::A {
            name,
            address: a.0,
        }),
        _ => None,
    }
}

fn trim_dot(name: &str) -> &str {
    name.trim_end_matches('.')
}
