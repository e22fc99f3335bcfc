/*!
STCP, a minimal TCP convergence layer.

There is no handshake and no framing header: each message on the stream is
exactly one CBOR-encoded bundle, and message boundaries fall out of the CBOR
item structure. A [`StcpSender`] keeps one persistent connection to its peer,
and a [`StcpReceiver`] accepts any number of connections, decoding each one
sequentially until it closes or sends something that is not a bundle.
*/

mod codec;
mod listener;
mod sender;


pub mod config;

pub use codec::{BundleCodec, Error};
pub use listener::StcpReceiver;
pub use sender::StcpSender;

use dtnd_bpv7::{bundle::Bundle, bundle::ValidBundle, eid::Eid};
use dtnd_cbor as cbor;
use dtnd_cla as cla;
use std::sync::Arc;
use tracing::{debug, info, warn};
