//! Buffered TCP and UDP streams with push/pop serialization and
//! deadline-bounded I/O.
//!
//! A [`TcpServer`]/[`TcpClient`] or [`UdpServer`]/[`UdpClient`] sets up a
//! socket and hands it to a stream. Values are pushed into the stream's send
//! buffer in network byte order, flushed with [`Stream::send`], received
//! into the receive buffer with `recv`, and popped back out.
//!
//! ```no_run
//! use netstream::{Stream, TcpClient};
//!
//! let mut stream = TcpClient::new("127.0.0.1", 3490)?.connect()?;
//! stream.push(0u32);
//! stream.send()?;
//!
//! if stream.recv(4)? == 4 {
//!     let answer: u32 = stream.pop()?;
//!     println!("the answer is {answer:#x}");
//! }
//! # Ok::<(), netstream::Error>(())
//! ```
//!
//! Every slow operation is bounded by the timeouts in [`Config`]. Receive
//! timeouts return what arrived so far; send timeouts are errors.

pub mod buffer;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod net;
pub mod server;
mod signal;
pub mod stream;
mod trace;

pub use buffer::Buffer;
pub use client::{TcpClient, UdpClient};
pub use codec::{Decode, Encode};
pub use config::{Config, IpVersion};
pub use error::{Error, Result};
pub use net::{Endpoint, Protocol};
pub use server::{TcpServer, UdpServer};
pub use signal::INTERRUPT_SIGNAL;
pub use stream::{Stream, TcpStream, UdpStream};
pub use trace::init_tracing;
