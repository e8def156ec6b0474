//! Durable output for classified crawl results

pub mod chunk;

pub use chunk::ChunkSink;
