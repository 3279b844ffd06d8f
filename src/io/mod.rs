//! I/O helpers shared by the file source and the CLI tools.

pub mod jsonl;
