//! Base58Check addresses for the two hash templates.
//!
//! An address is a version byte and a 20-byte hash. The version byte says
//! whether the hash is of a public key (P2PKH) or of a redeem script (P2SH),
//! and which network it belongs to. Which byte means what depends on the
//! `ChainParams` supplied by the caller.

use std::fmt;

use ledger_primitives::base58;

use crate::chainparams::ChainParams;
use crate::{Script, ScriptError};

/// What the address hash commits to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddressKind {
    /// Hash160 of a public key.
    PubkeyHash,
    /// Hash160 of a redeem script.
    ScriptHash,
}

/// A decoded Base58Check address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Address {
    /// The human-readable Base58Check address string.
    pub address_string: String,
    /// The version byte.
    pub version: u8,
    /// The 20-byte hash.
    pub hash: [u8; 20],
}

impl Address {
    /// Parse a Base58Check-encoded address string.
    ///
    /// Only the encoding is checked here; whether the version byte belongs
    /// to a network is answered by [`Address::is_valid`].
    ///
    /// # Arguments
    /// * `addr` - The Base58Check address string.
    ///
    /// # Returns
    /// An `Address`, or an error for bad characters, a checksum mismatch,
    /// or a payload that is not exactly 21 bytes.
    pub fn from_string(addr: &str) -> Result<Self, ScriptError> {
        let payload = base58::check_decode(addr)
            .map_err(|e| ScriptError::InvalidAddress(format!("{}: {}", addr, e)))?;

        if payload.len() != 21 {
            return Err(ScriptError::InvalidAddress(format!(
                "{}: payload is {} bytes",
                addr,
                payload.len()
            )));
        }

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        Ok(Address {
            address_string: addr.to_string(),
            version: payload[0],
            hash,
        })
    }

    /// Create an address from a 20-byte hash.
    ///
    /// # Arguments
    /// * `hash` - Hash160 of the public key or redeem script.
    /// * `kind` - Which of the two the hash is of.
    /// * `params` - Network whose version byte to use.
    pub fn from_hash(hash: &[u8; 20], kind: AddressKind, params: &ChainParams) -> Self {
        let version = match kind {
            AddressKind::PubkeyHash => params.pubkey_address_prefix,
            AddressKind::ScriptHash => params.script_address_prefix,
        };

        let mut payload = Vec::with_capacity(21);
        payload.push(version);
        payload.extend_from_slice(hash);

        Address {
            address_string: base58::check_encode(&payload),
            version,
            hash: *hash,
        }
    }

    /// Recover the address paid by a P2PKH or P2SH output script.
    ///
    /// # Returns
    /// The address, or `NoAddressForm` for any other script.
    pub fn from_script_pubkey(script: &Script, params: &ChainParams) -> Result<Self, ScriptError> {
        let bytes = script.to_bytes();
        let mut hash = [0u8; 20];
        if script.is_p2pkh() {
            hash.copy_from_slice(&bytes[3..23]);
            Ok(Self::from_hash(&hash, AddressKind::PubkeyHash, params))
        } else if script.is_pay_to_script_hash() {
            hash.copy_from_slice(&bytes[2..22]);
            Ok(Self::from_hash(&hash, AddressKind::ScriptHash, params))
        } else {
            Err(ScriptError::NoAddressForm)
        }
    }

    /// The address kind on `params`' network, if the version byte is one of
    /// its two address prefixes.
    pub fn kind(&self, params: &ChainParams) -> Option<AddressKind> {
        if self.version == params.pubkey_address_prefix {
            Some(AddressKind::PubkeyHash)
        } else if self.version == params.script_address_prefix {
            Some(AddressKind::ScriptHash)
        } else {
            None
        }
    }

    /// Return true if the version byte belongs to `params`' network.
    pub fn is_valid(&self, params: &ChainParams) -> bool {
        self.kind(params).is_some()
    }

    /// Return true if this is a script-hash address on `params`' network.
    pub fn is_script(&self, params: &ChainParams) -> bool {
        self.kind(params) == Some(AddressKind::ScriptHash)
    }

    /// Build the output script that pays this address.
    ///
    /// # Returns
    /// The P2PKH or P2SH template, or `WrongNetwork` if the version byte is
    /// not an address prefix of `params`' network.
    pub fn script_pubkey(&self, params: &ChainParams) -> Result<Script, ScriptError> {
        match self.kind(params) {
            Some(AddressKind::PubkeyHash) => Ok(Script::new_p2pkh(&self.hash)),
            Some(AddressKind::ScriptHash) => Ok(Script::new_p2sh(&self.hash)),
            None => Err(ScriptError::WrongNetwork(
                self.address_string.clone(),
                params.network.to_string(),
            )),
        }
    }
}

impl fmt::Display for Address {
    /// Display the address as its Base58Check string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address_string)
    }
}

#[cfg(test)]
mod tests {
    //! Tests for address parsing, construction and the script boundary.
    //!
    //! Covers from_string for main and test network addresses, checksum
    //! and length errors, from_hash for both kinds, network validation,
    //! and conversion to and from output scripts.

    use super::*;
    use ledger_primitives::hash::hash160;

    const PKH: &str = "8fe80c75c9560e8b56ed64ea3c26e18d2c52211b";

    fn pkh() -> [u8; 20] {
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&hex::decode(PKH).unwrap());
        hash
    }

    // -----------------------------------------------------------------------
    // from_string
    // -----------------------------------------------------------------------

    /// Parse a known main network address.
    #[test]
    fn test_from_string_main() {
        let address_str = "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr";
        let addr = Address::from_string(address_str).expect("should parse");
        assert_eq!(addr.address_string, address_str);
        assert_eq!(hex::encode(addr.hash), PKH);
        assert_eq!(addr.version, 0);
        assert!(addr.is_valid(&ChainParams::main()));
        assert!(!addr.is_valid(&ChainParams::test()));
        assert!(!addr.is_script(&ChainParams::main()));
    }

    /// Parse the test network address of the same hash.
    #[test]
    fn test_from_string_test() {
        let addr = Address::from_string("mtdruWYVEV1wz5yL7GvpBj4MgifCB7yhPd").expect("should parse");
        assert_eq!(hex::encode(addr.hash), PKH);
        assert_eq!(addr.version, 111);
        assert!(addr.is_valid(&ChainParams::test()));
        assert!(addr.is_valid(&ChainParams::regtest()));
        assert!(!addr.is_valid(&ChainParams::main()));
    }

    /// Short strings and corrupted checksums are rejected.
    #[test]
    fn test_from_string_errors() {
        assert!(Address::from_string("ADD8E55").is_err());
        assert!(Address::from_string("1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMs").is_err());
        assert!(Address::from_string("0OIl").is_err());
    }

    /// A valid Base58Check string of the wrong length is not an address.
    #[test]
    fn test_from_string_wrong_length() {
        let mut payload = vec![0u8];
        payload.extend_from_slice(&[0x11; 19]);
        let encoded = base58::check_encode(&payload);
        assert!(matches!(
            Address::from_string(&encoded),
            Err(ScriptError::InvalidAddress(_))
        ));
    }

    // -----------------------------------------------------------------------
    // from_hash
    // -----------------------------------------------------------------------

    /// from_hash reproduces the known main and test strings.
    #[test]
    fn test_from_hash_pubkey() {
        let main = Address::from_hash(&pkh(), AddressKind::PubkeyHash, &ChainParams::main());
        assert_eq!(main.to_string(), "1E7ucTTWRTahCyViPhxSMor2pj4VGQdFMr");
        let test = Address::from_hash(&pkh(), AddressKind::PubkeyHash, &ChainParams::test());
        assert_eq!(test.to_string(), "mtdruWYVEV1wz5yL7GvpBj4MgifCB7yhPd");
    }

    /// Address of a compressed public key, from a known vector.
    #[test]
    fn test_from_hash_of_public_key() {
        let pubkey =
            hex::decode("026cf33373a9f3f6c676b75b543180703df225f7f8edbffedc417718a8ad4e89ce")
                .unwrap();
        let hash = hash160(&pubkey);
        let addr = Address::from_hash(&hash, AddressKind::PubkeyHash, &ChainParams::main());
        assert_eq!(addr.address_string, "114ZWApV4EEU8frr7zygqQcB1V2BodGZuS");
    }

    /// Script-hash addresses start with '3' on main and '2' on test.
    #[test]
    fn test_from_hash_script() {
        let main = Address::from_hash(&pkh(), AddressKind::ScriptHash, &ChainParams::main());
        assert!(main.address_string.starts_with('3'));
        assert!(main.is_script(&ChainParams::main()));

        let test = Address::from_hash(&pkh(), AddressKind::ScriptHash, &ChainParams::test());
        assert!(test.address_string.starts_with('2'));

        let parsed = Address::from_string(&main.address_string).unwrap();
        assert_eq!(parsed, main);
    }

    // -----------------------------------------------------------------------
    // Script boundary
    // -----------------------------------------------------------------------

    /// script_pubkey builds the template matching the version byte.
    #[test]
    fn test_script_pubkey() {
        let main = ChainParams::main();
        let p2pkh = Address::from_hash(&pkh(), AddressKind::PubkeyHash, &main);
        let script = p2pkh.script_pubkey(&main).unwrap();
        assert_eq!(script.to_hex(), format!("76a914{}88ac", PKH));
        assert!(script.is_p2pkh());

        let p2sh = Address::from_hash(&pkh(), AddressKind::ScriptHash, &main);
        assert!(p2sh.script_pubkey(&main).unwrap().is_pay_to_script_hash());
    }

    /// script_pubkey refuses an address from another network.
    #[test]
    fn test_script_pubkey_wrong_network() {
        let addr = Address::from_hash(&pkh(), AddressKind::PubkeyHash, &ChainParams::test());
        assert!(matches!(
            addr.script_pubkey(&ChainParams::main()),
            Err(ScriptError::WrongNetwork(_, _))
        ));
    }

    /// Output scripts map back to their addresses.
    #[test]
    fn test_from_script_pubkey() {
        let main = ChainParams::main();
        for kind in [AddressKind::PubkeyHash, AddressKind::ScriptHash] {
            let addr = Address::from_hash(&pkh(), kind, &main);
            let script = addr.script_pubkey(&main).unwrap();
            assert_eq!(Address::from_script_pubkey(&script, &main).unwrap(), addr);
        }
    }

    /// Scripts without an address form are rejected.
    #[test]
    fn test_from_script_pubkey_no_form() {
        let witness = Script::new_witness_program(0, &[0x01; 20]).unwrap();
        assert!(matches!(
            Address::from_script_pubkey(&witness, &ChainParams::main()),
            Err(ScriptError::NoAddressForm)
        ));
    }
}
