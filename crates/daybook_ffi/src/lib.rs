//! Flutter bridge for daybook core.
//!
//! Everything exported lives in [`api`]; the generated bridge glue is produced
//! by `flutter_rust_bridge_codegen` from that module.

pub mod api;
