use crate::config::DiscoveryConfig;
use crate::error::{Result, ShellyError};
use crate::protocol::{self, MdnsResponse, MDNS_ADDR, MDNS_PORT};
use async_trait::async_trait;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::UdpSocket;

/// Largest mDNS packet accepted (RFC 6762 allows up to 9000 bytes)
const MAX_PACKET: usize = 9000;

/// A stream of decoded mDNS responses
///
/// Implemented by [`MdnsListener`] for real networks; tests and hosts with
/// their own responder can feed responses through any other implementation.
#[async_trait]
pub trait ResponseSource: Send {
    /// Wait for the next response
    ///
    /// Returns [`ShellyError::ListenerClosed`] once [`stop`](Self::stop) has
    /// been called.
    async fn recv(&mut self) -> Result<MdnsResponse>;

    /// Release the underlying socket; safe to call more than once
    fn stop(&mut self);
}

/// Multicast DNS listener that issues one PTR query and yields responses
pub struct MdnsListener {
    socket: Option<UdpSocket>,
    buffer: Vec<u8>,
}

impl MdnsListener {
    /// Join the mDNS group and send a PTR query for the configured service
    ///
    /// Socket setup failures surface as [`ShellyError::Io`]; a failed send is
    /// reported as [`ShellyError::QuerySend`].
    pub async fn start(config: &DiscoveryConfig) -> Result<Self> {
        let socket = bind_multicast(config.interface)?;

        let query = protocol::encode_query(&config.service_name)?;
        if let Err(e) = send_query(&socket, &query, SocketAddrV4::new(MDNS_ADDR, MDNS_PORT)).await {
            tracing::error!("Error while querying {}: {}", config.service_name, e);
            return Err(e);
        }

        tracing::info!("Sent mDNS PTR query for {}", config.service_name);

        Ok(Self::from_socket(socket))
    }

    /// Listen on an already bound socket without sending a query
    pub(crate) fn from_socket(socket: UdpSocket) -> Self {
        Self {
            socket: Some(socket),
            buffer: vec![0u8; MAX_PACKET],
        }
    }

    /// Whether the socket is still open
    pub fn is_listening(&self) -> bool {
        self.socket.is_some()
    }
}

#[async_trait]
impl ResponseSource for MdnsListener {
    async fn recv(&mut self) -> Result<MdnsResponse> {
        loop {
            let socket = self.socket.as_ref().ok_or(ShellyError::ListenerClosed)?;
            let (len, from) = socket.recv_from(&mut self.buffer).await?;

            match protocol::decode_response(&self.buffer[..len]) {
                Ok(Some(response)) => return Ok(response),
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!("Skipping undecodable packet from {}: {}", from, e);
                }
            }
        }
    }

    fn stop(&mut self) {
        if self.socket.take().is_some() {
            tracing::info!("Stopped mDNS listener");
        }
    }
}

/// Send an encoded query, mapping any failure to [`ShellyError::QuerySend`]
async fn send_query(socket: &UdpSocket, query: &[u8], target: SocketAddrV4) -> Result<()> {
    socket
        .send_to(query, target)
        .await
        .map_err(ShellyError::QuerySend)?;
    Ok(())
}

fn bind_multicast(interface: Ipv4Addr) -> Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, MDNS_PORT);
    socket.bind(&SockAddr::from(bind_addr))?;

    socket.join_multicast_v4(&MDNS_ADDR, &interface)?;
    socket.set_multicast_loop_v4(true)?;
    socket.set_multicast_ttl_v4(255)?;
    if !interface.is_unspecified() {
        socket.set_multicast_if_v4(&interface)?;
    }
    socket.set_nonblocking(true)?;

    Ok(UdpSocket::from_std(socket.into())?)
}
