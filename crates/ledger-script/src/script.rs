//! Script buffer - an ordered sequence of opcodes and data pushes.
//!
//! Scripts are used in transaction inputs (unlocking) and outputs (locking)
//! to define spending conditions. The Script wraps a `Vec<u8>` and provides
//! canonical append operators, the opcode reader entry points, ASM and hex
//! forms, and the wire serialization. Classification lives in `classify`.

use std::fmt;
use std::ops::{Add, AddAssign};

use ledger_primitives::util::{ByteReader, ByteWriter};

use crate::chunk::{push_data_prefix, read_op, Chunks, ScriptChunk};
use crate::limits::{MAX_WITNESS_PROGRAM_SIZE, MIN_WITNESS_PROGRAM_SIZE};
use crate::opcodes::*;
use crate::{script_num, ScriptError};

/// A script, represented as a byte vector newtype.
///
/// A `Script` may hold any bytes, including malformed pushes; validity is a
/// derived property (see [`Script::has_valid_ops`]). It does not
/// implement `AsRef<[u8]>` or `Deref`, so a script cannot be handed to
/// [`Script::append_push_data`] by accident:
///
/// ```compile_fail
/// use ledger_script::Script;
///
/// let inner = Script::new();
/// let mut outer = Script::new();
/// outer.append_push_data(&inner).unwrap();
/// ```
///
/// Concatenation uses [`Script::append_script`] or `+`. Pushing the bytes
/// of a serialized redeem script is spelled out with [`Script::to_bytes`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Script(Vec<u8>);

impl Script {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// Create a new empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Create a script from a hex-encoded string.
    ///
    /// # Arguments
    /// * `hex_str` - A hex string (e.g. "76a914...88ac").
    ///
    /// # Returns
    /// A `Script` wrapping the decoded bytes, or an error if the hex is invalid.
    pub fn from_hex(hex_str: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(hex_str)
            .map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Ok(Script(bytes))
    }

    /// Create a script from a copy of raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Script(bytes.to_vec())
    }

    /// Create a script from an ASM string.
    ///
    /// Parses space-separated tokens where known opcode names are appended
    /// directly and anything else is treated as hex push data. Push opcode
    /// names (`OP_DATA_n`, `OP_PUSHDATAn`) are rejected because the encoder
    /// picks the push form itself.
    ///
    /// # Returns
    /// A `Script`, or an error if any token is invalid.
    pub fn from_asm(asm: &str) -> Result<Self, ScriptError> {
        let mut script = Script::new();
        for section in asm.split_whitespace() {
            match string_to_opcode(section) {
                Some(op) if is_push_length_opcode(op) => {
                    return Err(ScriptError::InvalidOpcodeType(section.to_string()));
                }
                Some(op) => {
                    script.append_opcode(op);
                }
                None => {
                    script.append_push_data_hex(section)?;
                }
            }
        }
        Ok(script)
    }

    /// Build the pay-to-pubkey-hash template
    /// `OP_DUP OP_HASH160 <20 bytes> OP_EQUALVERIFY OP_CHECKSIG`.
    pub fn new_p2pkh(pubkey_hash: &[u8; 20]) -> Self {
        let mut script = Script(Vec::with_capacity(25));
        script.append_opcode(OP_DUP).append_opcode(OP_HASH160);
        script.append_fixed_push(pubkey_hash);
        script.append_opcode(OP_EQUALVERIFY).append_opcode(OP_CHECKSIG);
        script
    }

    /// Build the pay-to-script-hash template `OP_HASH160 <20 bytes> OP_EQUAL`.
    pub fn new_p2sh(script_hash: &[u8; 20]) -> Self {
        let mut script = Script(Vec::with_capacity(23));
        script.append_opcode(OP_HASH160);
        script.append_fixed_push(script_hash);
        script.append_opcode(OP_EQUAL);
        script
    }

    /// Build a witness program script `<version opcode> <program>`.
    ///
    /// # Arguments
    /// * `version` - Witness version, 0..=16.
    /// * `program` - 2 to 40 program bytes.
    ///
    /// # Returns
    /// The script, or `InvalidWitnessProgram` for an out-of-range version or
    /// program length.
    pub fn new_witness_program(version: u8, program: &[u8]) -> Result<Self, ScriptError> {
        let version_op = encode_op_n(version)
            .map_err(|_| ScriptError::InvalidWitnessProgram(format!("version {}", version)))?;
        if !(MIN_WITNESS_PROGRAM_SIZE..=MAX_WITNESS_PROGRAM_SIZE).contains(&program.len()) {
            return Err(ScriptError::InvalidWitnessProgram(format!(
                "program length {}",
                program.len()
            )));
        }
        let mut script = Script(Vec::with_capacity(2 + program.len()));
        script.append_opcode(version_op);
        script.append_fixed_push(program);
        Ok(script)
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    /// Encode the script as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Convert the script to its ASM representation.
    ///
    /// Data pushes appear as hex, opcodes by name. A malformed tail is
    /// rendered as `[error]` after the chunks that did decode.
    pub fn to_asm(&self) -> String {
        let mut parts = Vec::new();
        for chunk in self.chunks() {
            match chunk {
                Ok(chunk) => parts.push(chunk.to_asm_string()),
                Err(_) => {
                    parts.push("[error]".to_string());
                    break;
                }
            }
        }
        parts.join(" ")
    }

    /// Return a reference to the underlying bytes.
    pub fn to_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the script and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Write the script in wire format: compact-size length, then the bytes.
    pub fn write_to(&self, writer: &mut ByteWriter) {
        writer.write_var_bytes(&self.0);
    }

    /// Read a script in wire format.
    ///
    /// # Returns
    /// The script, or a primitives error if the length prefix is
    /// non-canonical, too large, or runs past the input.
    pub fn read_from(reader: &mut ByteReader) -> Result<Self, ScriptError> {
        let len = reader.read_compact_size()?;
        let bytes = reader.read_bytes(len as usize)?;
        Ok(Script::from_bytes(bytes))
    }

    // -----------------------------------------------------------------------
    // Structural queries
    // -----------------------------------------------------------------------

    /// Return the length of the script in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the script is empty (zero bytes).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the capacity of the backing allocation in bytes.
    pub fn capacity(&self) -> usize {
        self.0.capacity()
    }

    /// Empty the script and release its backing allocation.
    ///
    /// Scripts are frequently short-lived; a cleared script must not keep
    /// its old buffer alive.
    pub fn clear(&mut self) {
        self.0 = Vec::new();
    }

    // -----------------------------------------------------------------------
    // Append operators
    // -----------------------------------------------------------------------

    /// Append a single opcode byte.
    pub fn append_opcode(&mut self, opcode: u8) -> &mut Self {
        self.0.push(opcode);
        self
    }

    /// Append an opcode given as a numeric value.
    ///
    /// # Returns
    /// `InvalidOpcode` if the value is outside 0..=255; nothing is appended.
    pub fn append_opcode_value(&mut self, value: i64) -> Result<&mut Self, ScriptError> {
        let opcode = opcode_from_value(value)?;
        Ok(self.append_opcode(opcode))
    }

    /// Append an integer in canonical form.
    ///
    /// -1 and 1..=16 become OP_1NEGATE and OP_1..OP_16, 0 becomes OP_0, and
    /// every other value is pushed as a minimal script number. Small-integer
    /// decoding and accurate sigop counting depend on this form.
    pub fn append_int(&mut self, n: i64) -> &mut Self {
        match n {
            0 => self.append_opcode(OP_0),
            -1 => self.append_opcode(OP_1NEGATE),
            1..=16 => self.append_opcode(OP_1 + (n as u8) - 1),
            _ => {
                // Script numbers are at most 9 bytes, always a direct push.
                let bytes = script_num::serialize(n);
                self.append_fixed_push(&bytes);
                self
            }
        }
    }

    /// Append data bytes with the shortest valid push prefix.
    ///
    /// Chooses a direct push below 76 bytes, OP_PUSHDATA1 up to 255,
    /// OP_PUSHDATA2 up to 65535 and OP_PUSHDATA4 beyond.
    ///
    /// # Returns
    /// `DataTooBig` if the payload is longer than `u32::MAX` bytes.
    pub fn append_push_data(&mut self, data: &[u8]) -> Result<&mut Self, ScriptError> {
        let prefix = push_data_prefix(data.len())?;
        self.0.reserve(prefix.len() + data.len());
        self.0.extend_from_slice(&prefix);
        self.0.extend_from_slice(data);
        Ok(self)
    }

    /// Append hex-encoded data with the shortest valid push prefix.
    pub fn append_push_data_hex(&mut self, hex_str: &str) -> Result<&mut Self, ScriptError> {
        let data = hex::decode(hex_str).map_err(|_| ScriptError::InvalidOpcodeData)?;
        self.append_push_data(&data)
    }

    /// Append another script's bytes (concatenation, not a nested push).
    pub fn append_script(&mut self, other: &Script) -> &mut Self {
        self.0.extend_from_slice(&other.0);
        self
    }

    // Direct push for payloads known to be shorter than OP_PUSHDATA1.
    fn append_fixed_push(&mut self, data: &[u8]) {
        debug_assert!(data.len() < OP_PUSHDATA1 as usize);
        self.0.push(data.len() as u8);
        self.0.extend_from_slice(data);
    }

    // -----------------------------------------------------------------------
    // Reading
    // -----------------------------------------------------------------------

    /// Read a single opcode and operand at `*pos`, advancing `pos`.
    ///
    /// See [`crate::chunk::read_op`] for the decoding rules.
    pub fn read_op(&self, pos: &mut usize) -> Result<ScriptChunk<'_>, ScriptError> {
        read_op(&self.0, pos)
    }

    /// Iterate over the chunks of this script.
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks::new(&self.0)
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl AddAssign<&Script> for Script {
    fn add_assign(&mut self, rhs: &Script) {
        self.append_script(rhs);
    }
}

impl Add<&Script> for Script {
    type Output = Script;

    fn add(mut self, rhs: &Script) -> Script {
        self += rhs;
        self
    }
}

impl fmt::Display for Script {
    /// Display the script as a lowercase hex string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", self.to_hex())
    }
}

impl serde::Serialize for Script {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Script {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Script::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    //! Tests for the Script buffer.
    //!
    //! Covers construction from hex/ASM, the canonical append operators at
    //! every push length class, integer canonicalization, concatenation,
    //! clearing, wire serialization, and serde.

    use super::*;

    // -----------------------------------------------------------------------
    // Construction & ASM
    // -----------------------------------------------------------------------

    /// from_hex and to_hex round-trip a P2PKH script.
    #[test]
    fn test_from_hex_roundtrip() {
        let hex_str = "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac";
        let script = Script::from_hex(hex_str).expect("valid hex should parse");
        assert_eq!(script.to_hex(), hex_str);
    }

    /// from_hex rejects invalid hex characters.
    #[test]
    fn test_from_hex_invalid() {
        assert!(matches!(Script::from_hex("ZZZZ"), Err(ScriptError::InvalidHex(_))));
    }

    /// to_asm renders a P2PKH script.
    #[test]
    fn test_to_asm_p2pkh() {
        let script = Script::from_hex("76a914e2a623699e81b291c0327f408fea765d534baa2a88ac")
            .expect("valid hex");
        assert_eq!(
            script.to_asm(),
            "OP_DUP OP_HASH160 e2a623699e81b291c0327f408fea765d534baa2a OP_EQUALVERIFY OP_CHECKSIG"
        );
    }

    /// to_asm marks a truncated tail instead of dropping the whole script.
    #[test]
    fn test_to_asm_malformed_tail() {
        let script = Script::from_bytes(&[OP_DUP, OP_PUSHDATA2, 0x01]);
        assert_eq!(script.to_asm(), "OP_DUP [error]");
    }

    /// from_asm builds the same bytes as the hex form.
    #[test]
    fn test_from_asm_p2pkh() {
        let asm = "OP_DUP OP_HASH160 e2a623699e81b291c0327f408fea765d534baa2a OP_EQUALVERIFY OP_CHECKSIG";
        let script = Script::from_asm(asm).expect("valid ASM should parse");
        assert_eq!(script.to_hex(), "76a914e2a623699e81b291c0327f408fea765d534baa2a88ac");
        assert_eq!(Script::from_asm(&script.to_asm()).unwrap(), script);
    }

    /// from_asm of an empty string is the empty script.
    #[test]
    fn test_from_asm_empty() {
        assert!(Script::from_asm("").expect("empty ASM should parse").is_empty());
    }

    /// from_asm refuses explicit push opcode names and bad hex.
    #[test]
    fn test_from_asm_rejects_push_opcodes() {
        assert!(matches!(
            Script::from_asm("OP_PUSHDATA1 00"),
            Err(ScriptError::InvalidOpcodeType(_))
        ));
        assert!(Script::from_asm("OP_DUP xyz").is_err());
    }

    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    /// p2pkh and p2sh produce the fixed template bytes.
    #[test]
    fn test_template_builders() {
        let hash = [0x11u8; 20];
        let p2pkh = Script::new_p2pkh(&hash);
        assert_eq!(p2pkh.to_hex(), format!("76a914{}88ac", "11".repeat(20)));
        let p2sh = Script::new_p2sh(&hash);
        assert_eq!(p2sh.to_hex(), format!("a914{}87", "11".repeat(20)));
    }

    /// witness_program enforces the version and program length ranges.
    #[test]
    fn test_witness_program_builder() {
        let script = Script::new_witness_program(0, &[0xaa; 32]).unwrap();
        assert_eq!(script.len(), 34);
        assert_eq!(script.to_bytes()[0], OP_0);
        assert_eq!(Script::new_witness_program(16, &[0x01; 2]).unwrap().to_bytes()[0], OP_16);
        assert!(Script::new_witness_program(17, &[0x01; 2]).is_err());
        assert!(Script::new_witness_program(0, &[0x01; 1]).is_err());
        assert!(Script::new_witness_program(0, &[0x01; 41]).is_err());
    }

    // -----------------------------------------------------------------------
    // Append operators
    // -----------------------------------------------------------------------

    /// Every length class boundary round-trips through read_op with the
    /// minimal prefix.
    #[test]
    fn test_append_push_data_length_classes() {
        let cases: &[(usize, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (75, &[0x4b]),
            (76, &[OP_PUSHDATA1, 76]),
            (255, &[OP_PUSHDATA1, 0xff]),
            (256, &[OP_PUSHDATA2, 0x00, 0x01]),
            (65535, &[OP_PUSHDATA2, 0xff, 0xff]),
            (65536, &[OP_PUSHDATA4, 0x00, 0x00, 0x01, 0x00]),
        ];
        for (len, prefix) in cases {
            let data: Vec<u8> = (0..*len).map(|i| (i % 251) as u8).collect();
            let mut script = Script::new();
            script.append_push_data(&data).expect("push should succeed");
            assert_eq!(&script.to_bytes()[..prefix.len()], *prefix, "length {}", len);
            assert_eq!(script.len(), prefix.len() + len);

            let mut pos = 0;
            let chunk = script.read_op(&mut pos).expect("should decode");
            assert_eq!(chunk.data, Some(&data[..]), "length {}", len);
            assert_eq!(pos, script.len());
        }
    }

    /// A small push encodes as length byte plus data.
    #[test]
    fn test_append_push_data_small() {
        let mut script = Script::new();
        script.append_push_data(&[0x01, 0x02, 0x03, 0x04, 0x05]).expect("push should succeed");
        assert_eq!(script.to_hex(), "050102030405");
    }

    /// Canonical integers: -1, 0, 1, 16 are single opcodes; 17 and -2 are pushes.
    #[test]
    fn test_append_int_canonical() {
        let cases: &[(i64, &str)] = &[
            (-1, "4f"),
            (0, "00"),
            (1, "51"),
            (16, "60"),
            (17, "0111"),
            (-2, "0182"),
            (1000, "02e803"),
            (-1000, "02e883"),
        ];
        for (n, expected) in cases {
            let mut script = Script::new();
            script.append_int(*n);
            assert_eq!(script.to_hex(), *expected, "value {}", n);
        }
    }

    /// Decoding an appended integer gives the value back.
    #[test]
    fn test_append_int_decodes_back() {
        for n in [-1i64, 0, 1, 16, 17, -2, 128, -129, 1 << 33] {
            let mut script = Script::new();
            script.append_int(n);
            let mut pos = 0;
            let chunk = script.read_op(&mut pos).unwrap();
            let decoded = match chunk.op {
                OP_1NEGATE => -1,
                op if is_small_int_op(op) => decode_op_n(op).unwrap() as i64,
                _ => script_num::deserialize(chunk.data.unwrap(), 8, true).unwrap(),
            };
            assert_eq!(decoded, n);
            assert_eq!(pos, script.len());
        }
    }

    /// append_opcode_value rejects values outside a byte and appends nothing.
    #[test]
    fn test_append_opcode_value() {
        let mut script = Script::new();
        script.append_opcode_value(OP_CHECKSIG as i64).unwrap();
        assert_eq!(script.to_bytes(), &[OP_CHECKSIG]);
        assert!(matches!(
            script.append_opcode_value(256),
            Err(ScriptError::InvalidOpcode(256))
        ));
        assert!(script.append_opcode_value(-1).is_err());
        assert_eq!(script.len(), 1);
    }

    /// append_opcode appends exactly one byte, push opcodes included.
    #[test]
    fn test_append_opcode_chaining() {
        let mut script = Script::from_asm("OP_2 OP_2 OP_ADD").expect("valid ASM");
        script.append_opcode(OP_4).append_opcode(OP_EQUALVERIFY);
        assert_eq!(script.to_hex(), "5252935488");
    }

    /// Concatenation joins bytes rather than pushing the script.
    #[test]
    fn test_concatenation() {
        let a = Script::from_hex("5152").unwrap();
        let b = Script::from_hex("93").unwrap();
        let mut c = a.clone();
        c.append_script(&b);
        assert_eq!(c.to_hex(), "515293");
        let mut d = a.clone();
        d += &b;
        assert_eq!(d, c);
        assert_eq!(a + &b, c);
    }

    /// Pushing a script's serialized bytes is an explicit data push.
    #[test]
    fn test_push_serialized_script() {
        let redeem = Script::from_hex("5121aa").unwrap();
        let mut script_sig = Script::new();
        script_sig.append_push_data(redeem.to_bytes()).unwrap();
        assert_eq!(script_sig.to_hex(), "035121aa");
    }

    // -----------------------------------------------------------------------
    // Structural queries
    // -----------------------------------------------------------------------

    /// clear empties the script and releases its capacity.
    #[test]
    fn test_clear_releases_capacity() {
        let mut script = Script::new();
        script.append_push_data(&[0xab; 300]).unwrap();
        assert!(script.capacity() >= 303);
        script.clear();
        assert_eq!(script.len(), 0);
        assert!(script.is_empty());
        assert_eq!(script.capacity(), 0);
    }

    /// Default produces an empty script.
    #[test]
    fn test_default() {
        let script = Script::default();
        assert!(script.is_empty());
        assert_eq!(script.len(), 0);
    }

    // -----------------------------------------------------------------------
    // Wire serialization
    // -----------------------------------------------------------------------

    /// A script serializes as compact-size length followed by its bytes.
    #[test]
    fn test_write_read_wire() {
        let script = Script::from_hex("a9149de5aeaff9c48431ba4dd6e8af73d51f38e451cb87").unwrap();
        let mut writer = ByteWriter::new();
        script.write_to(&mut writer);
        let bytes = writer.into_bytes();
        assert_eq!(bytes[0], 23);
        assert_eq!(&bytes[1..], script.to_bytes());

        let mut reader = ByteReader::new(&bytes);
        assert_eq!(Script::read_from(&mut reader).unwrap(), script);
        assert_eq!(reader.remaining(), 0);
    }

    /// A long script uses the 0xfd length prefix.
    #[test]
    fn test_write_wire_long_script() {
        let script = Script::from_bytes(&[OP_NOP; 300]);
        let mut writer = ByteWriter::new();
        script.write_to(&mut writer);
        assert_eq!(&writer.as_bytes()[..3], &[0xfd, 0x2c, 0x01]);
    }

    /// A truncated wire script fails to read.
    #[test]
    fn test_read_wire_truncated() {
        let mut reader = ByteReader::new(&[0x05, 0x51, 0x52]);
        assert!(matches!(
            Script::read_from(&mut reader),
            Err(ScriptError::Primitives(_))
        ));
    }

    // -----------------------------------------------------------------------
    // serde / Display / Debug
    // -----------------------------------------------------------------------

    /// Script serializes to and from a hex JSON string.
    #[test]
    fn test_serde_roundtrip() {
        let script = Script::from_asm("OP_2 OP_2 OP_ADD OP_4 OP_EQUALVERIFY").expect("valid ASM");
        let json_str = serde_json::to_string(&script).expect("should serialize");
        assert_eq!(json_str, r#""5252935488""#);
        let back: Script = serde_json::from_str(&json_str).expect("should deserialize");
        assert_eq!(back, script);
    }

    /// Display is hex, Debug is wrapped.
    #[test]
    fn test_display_debug() {
        let script = Script::from_hex("76a9").unwrap();
        assert_eq!(format!("{}", script), "76a9");
        assert_eq!(format!("{:?}", script), "Script(76a9)");
    }
}
