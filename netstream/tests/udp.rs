//! UDP streams end to end over loopback.

use std::sync::Once;
use std::time::Duration;

use netstream::{Config, Error, Stream, UdpClient, UdpServer, UdpStream};

static INIT_TRACING: Once = Once::new();

fn init_test_tracing() {
    INIT_TRACING.call_once(|| {
        netstream::init_tracing();
    });
}

fn config() -> Config {
    Config {
        send_timeout: Duration::from_secs(1),
        recv_timeout: Duration::from_secs(1),
        ..Config::default()
    }
}

fn server() -> UdpServer {
    init_test_tracing();
    UdpServer::bind(0, config()).expect("bind")
}

fn client_for(server: &UdpServer) -> UdpStream {
    UdpClient::with_config("127.0.0.1", server.local_addr().port(), config())
        .expect("client")
        .get_stream()
        .expect("stream")
}

#[test]
fn client_to_server() {
    let server = server();
    let mut inbound = server.get_stream().unwrap();
    let mut client = client_for(&server);

    client.push(0x0102_0304u32).push(c"hi");
    client.send().unwrap();

    assert_eq!(inbound.recv().unwrap(), 7);
    assert_eq!(inbound.pop::<u32>().unwrap(), 0x0102_0304);
    assert_eq!(inbound.pop::<String>().unwrap(), "hi");
}

#[test]
fn server_replies_to_last_sender() {
    let server = server();
    let mut inbound = server.get_stream().unwrap();
    let mut client = client_for(&server);

    client.push(1u16);
    client.send().unwrap();
    inbound.recv().unwrap();
    assert!(inbound.peer().is_some());

    let request = inbound.pop::<u16>().unwrap();
    inbound.push(request + 1);
    inbound.send().unwrap();

    assert_eq!(client.recv().unwrap(), 2);
    assert_eq!(client.pop::<u16>().unwrap(), 2);
}

#[test]
fn server_stream_without_peer_cannot_send() {
    let server = server();
    let mut inbound = server.get_stream().unwrap();

    inbound.push(1u8);
    assert!(matches!(inbound.send(), Err(Error::NoPeer)));
    assert_eq!(inbound.buffer().pending(), &[1u8]);
}

#[test]
fn receive_times_out_with_zero() {
    init_test_tracing();
    let server = UdpServer::bind(0, Config {
        recv_timeout: Duration::from_millis(10),
        ..config()
    })
    .unwrap();
    let mut inbound = server.get_stream().unwrap();

    assert_eq!(inbound.recv().unwrap(), 0);
    assert!(inbound.is_empty());
}

#[test]
fn streams_share_server_socket() {
    let server = server();
    let mut first = server.get_stream().unwrap();
    let mut second = server.get_stream().unwrap();
    let mut a = client_for(&server);
    let mut b = client_for(&server);

    a.push(10u32);
    a.send().unwrap();
    assert_eq!(first.recv().unwrap(), 4);

    b.push(20u32);
    b.send().unwrap();
    assert_eq!(second.recv().unwrap(), 4);

    assert_eq!(first.pop::<u32>().unwrap(), 10);
    assert_eq!(second.pop::<u32>().unwrap(), 20);
    assert_ne!(first.peer(), second.peer());
}

#[test]
fn datagrams_accumulate_in_receive_buffer() {
    let server = server();
    let mut inbound = server.get_stream().unwrap();
    let mut client = client_for(&server);

    client.push(1u32);
    client.send().unwrap();
    client.push(2u32);
    client.send().unwrap();

    assert_eq!(inbound.recv().unwrap(), 4);
    assert_eq!(inbound.recv().unwrap(), 4);
    assert_eq!(inbound.size(), 8);
    assert_eq!(inbound.pop::<u32>().unwrap(), 1);
    assert_eq!(inbound.pop::<u32>().unwrap(), 2);
}

#[test]
fn oversized_datagram_is_truncated() {
    let server = server();
    let mut inbound = server.get_stream().unwrap();
    let mut client = client_for(&server);

    client.push([7u8; 1500]);
    client.send().unwrap();

    assert_eq!(inbound.recv().unwrap(), netstream::stream::RECV_CHUNK);
    assert!(inbound.buffer().unread().iter().all(|&b| b == 7));
}

#[test]
fn server_select_sees_datagram() {
    let mut server = server();
    let mut client = client_for(&server);

    assert!(!server.select(Duration::from_millis(20)).unwrap());
    client.push(1u8);
    client.send().unwrap();
    assert!(server.select(Duration::from_secs(1)).unwrap());

    let mut inbound = server.get_stream().unwrap();
    assert!(inbound.select(Duration::from_millis(20)).unwrap());
    assert_eq!(inbound.recv().unwrap(), 1);
}

#[test]
fn unbounded_receive_timeout_waits_for_datagram() {
    init_test_tracing();
    let server = UdpServer::bind(0, Config {
        recv_timeout: Duration::MAX,
        ..config()
    })
    .unwrap();
    let mut inbound = server.get_stream().unwrap();
    let mut client = client_for(&server);

    client.push(5u16);
    client.send().unwrap();
    assert_eq!(inbound.recv().unwrap(), 2);
    assert_eq!(inbound.pop::<u16>().unwrap(), 5);
}
