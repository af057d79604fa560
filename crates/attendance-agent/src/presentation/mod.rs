pub mod bootstrap;
pub mod dispatcher;
pub mod protocol;
pub mod reply_channel;
pub mod stdio;

pub use dispatcher::{AgentHandle, RequestDispatcher};
pub use protocol::{decode_line, AgentRequest, InboundMessage, ProtocolError};
pub use reply_channel::ReplyChannel;
