pub mod reader;
pub mod transport;

pub use reader::{parse_response, CounterReader, Reading, ReadingError};
pub use transport::{SerialTransport, Transport, TransportError};
