/// Ledger SDK - Script encoding, opcode reading and classification.
///
/// Provides the Script byte buffer with canonical append operators, the
/// opcode reader, consensus-relevant classifiers and sigop counting, the
/// witness stack container, and the address and chain parameter boundary.

pub mod script;
pub mod opcodes;
pub mod chunk;
pub mod classify;
pub mod script_num;
pub mod witness;
pub mod address;
pub mod chainparams;
pub mod reserve;
pub mod limits;

mod error;
pub use error::ScriptError;
pub use script::Script;
pub use chunk::ScriptChunk;
pub use witness::ScriptWitness;
pub use address::{Address, AddressKind};
pub use chainparams::{ChainParams, Network};
