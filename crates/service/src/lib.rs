//! Service layer for the memory engine.
//! - `memory` defines the record type and the store contract.
//! - `storage` reads/writes the JSON document and normalizes malformed content.
//! - `file` provides the file-backed store used by the server.
//! - `chat` wraps the external chat-completion API.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod memory;
pub mod file;
pub mod chat;
