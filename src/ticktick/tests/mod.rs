//! Unit tests for the `TickTick` source adapter.
//!
//! Tests are organised by concern: configuration, session caching,
//! transport retry, wire decoding, and the client against a scripted
//! transport.
