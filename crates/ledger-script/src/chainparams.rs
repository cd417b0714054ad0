//! Chain parameters.
//!
//! Per-network values the script layer needs at its boundary: Base58 version
//! prefixes and the default port. Code takes a `&ChainParams` explicitly;
//! [`select_params`] exists only for binaries that want a single
//! process-wide choice made once at startup.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::ScriptError;

/// A known network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Production network.
    Main,
    /// Public test network.
    Test,
    /// Local regression-test network.
    Regtest,
}

impl Network {
    /// The network's short name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Test => "test",
            Network::Regtest => "regtest",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main" => Ok(Network::Main),
            "test" => Ok(Network::Test),
            "regtest" => Ok(Network::Regtest),
            other => Err(ScriptError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Parameters for one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainParams {
    pub network: Network,
    /// Version byte of pay-to-pubkey-hash addresses.
    pub pubkey_address_prefix: u8,
    /// Version byte of pay-to-script-hash addresses.
    pub script_address_prefix: u8,
    /// Version byte of WIF-encoded secret keys.
    pub secret_key_prefix: u8,
    pub default_port: u16,
}

impl ChainParams {
    /// Main network: addresses start with '1' or '3'.
    pub fn main() -> Self {
        ChainParams {
            network: Network::Main,
            pubkey_address_prefix: 0,
            script_address_prefix: 5,
            secret_key_prefix: 128,
            default_port: 8333,
        }
    }

    /// Test network: addresses start with 'm', 'n' or '2'.
    pub fn test() -> Self {
        ChainParams {
            network: Network::Test,
            pubkey_address_prefix: 111,
            script_address_prefix: 196,
            secret_key_prefix: 239,
            default_port: 18333,
        }
    }

    /// Regression test network. Shares the test network's prefixes.
    pub fn regtest() -> Self {
        ChainParams {
            network: Network::Regtest,
            default_port: 18444,
            ..Self::test()
        }
    }
}

/// An explicit set of chain parameters keyed by network.
#[derive(Clone, Debug, Default)]
pub struct ParamsRegistry {
    entries: BTreeMap<Network, ChainParams>,
}

impl ParamsRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in main, test and regtest params.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for params in [ChainParams::main(), ChainParams::test(), ChainParams::regtest()] {
            // The three built-in networks are distinct.
            let _ = registry.register(params);
        }
        registry
    }

    /// Register parameters under their network.
    ///
    /// # Returns
    /// `NetworkAlreadyRegistered` if that network already has an entry; the
    /// existing entry is kept.
    pub fn register(&mut self, params: ChainParams) -> Result<(), ScriptError> {
        let network = params.network;
        if self.entries.contains_key(&network) {
            return Err(ScriptError::NetworkAlreadyRegistered(network.to_string()));
        }
        tracing::debug!(%network, "registered chain params");
        self.entries.insert(network, params);
        Ok(())
    }

    /// Look up the parameters for `network`.
    pub fn get(&self, network: Network) -> Result<&ChainParams, ScriptError> {
        self.entries
            .get(&network)
            .ok_or_else(|| ScriptError::UnknownNetwork(network.to_string()))
    }

    /// Iterate over the registered networks in order.
    pub fn networks(&self) -> impl Iterator<Item = Network> + '_ {
        self.entries.keys().copied()
    }
}

static SELECTED: OnceLock<ChainParams> = OnceLock::new();

/// Select the process-wide chain parameters from `registry`.
///
/// May succeed once per process. Later calls fail with
/// `ParamsAlreadySelected`, naming the network that was chosen, even if they
/// ask for the same network. A network missing from `registry` fails with
/// `UnknownNetwork` and selects nothing.
pub fn select_params(
    registry: &ParamsRegistry,
    network: Network,
) -> Result<&'static ChainParams, ScriptError> {
    if let Some(selected) = SELECTED.get() {
        return Err(ScriptError::ParamsAlreadySelected(
            selected.network.to_string(),
        ));
    }
    let chosen = registry.get(network)?.clone();
    let mut initialized = false;
    let selected = SELECTED.get_or_init(|| {
        initialized = true;
        chosen
    });
    if !initialized {
        return Err(ScriptError::ParamsAlreadySelected(
            selected.network.to_string(),
        ));
    }
    tracing::debug!(%network, "selected chain params");
    Ok(selected)
}

/// The process-wide chain parameters, if [`select_params`] has run.
pub fn params() -> Option<&'static ChainParams> {
    SELECTED.get()
}
