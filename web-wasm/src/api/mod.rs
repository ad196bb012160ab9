pub mod xhr;

pub use xhr::XhrTransport;
