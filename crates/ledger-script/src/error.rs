/// Error types for script operations.
///
/// Covers malformed push encodings reported by the opcode reader, invalid
/// opcode values at the append API, address decoding, and chain parameter
/// registration. Classification predicates never return these; they answer
/// `false` or a partial count on malformed input.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    /// A numeric opcode value outside 0..=255.
    #[error("invalid opcode: {0}")]
    InvalidOpcode(i64),

    /// Invalid opcode data encountered during ASM parsing.
    #[error("invalid opcode data")]
    InvalidOpcodeData,

    /// A push opcode name was used where a plain opcode was expected.
    #[error("use append_push_data for push data opcodes: {0}")]
    InvalidOpcodeType(String),

    /// Small integer opcode requested for a value outside 0..=16.
    #[error("small integer out of range: {0}")]
    SmallIntOutOfRange(u8),

    /// Invalid hex string.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// Script is empty when a non-empty script was expected.
    #[error("script is empty")]
    EmptyScript,

    /// Script is not a P2PKH script.
    #[error("not a P2PKH")]
    NotP2PKH,

    /// The length field or the operand of a push runs past the end of the script.
    #[error("not enough data")]
    DataTooSmall,

    /// Push data exceeds the largest length OP_PUSHDATA4 can declare.
    #[error("data too big")]
    DataTooBig,

    /// Read position is at or past the end of the script.
    #[error("script index out of range")]
    IndexOutOfRange,

    /// Script number is longer than allowed, or not minimally encoded.
    #[error("invalid script number: {0}")]
    InvalidScriptNumber(String),

    /// Witness version outside 0..=16 or program length outside 2..=40.
    #[error("invalid witness program: {0}")]
    InvalidWitnessProgram(String),

    /// Invalid address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Address version byte does not belong to the given network.
    #[error("address {0} is not valid for network {1}")]
    WrongNetwork(String, String),

    /// Script does not match a template that has an address form.
    #[error("script has no address form")]
    NoAddressForm,

    /// Network name not recognized, or not present in the registry.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    /// A network variant was registered twice.
    #[error("network already registered: {0}")]
    NetworkAlreadyRegistered(String),

    /// Process-wide parameters were already selected.
    #[error("chain parameters already selected: {0}")]
    ParamsAlreadySelected(String),

    /// Error from primitives crate.
    #[error("primitives error: {0}")]
    Primitives(#[from] ledger_primitives::PrimitivesError),
}
