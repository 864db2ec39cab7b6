// simpleapi-api: HTTP transport used by the simpleapi coordinator

pub mod client;
pub mod decode;
pub mod error;
pub mod request;
pub mod transport;

pub use client::{HttpClient, Transport};
pub use decode::{decode_many, decode_one};
pub use error::Error;
pub use request::{Headers, HttpRequest, Method, Params, ParamsEncoding};
pub use transport::{TlsMode, TransportConfig};
