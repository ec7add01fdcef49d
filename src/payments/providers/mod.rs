pub mod intasend;

pub use intasend::IntaSendProvider;
