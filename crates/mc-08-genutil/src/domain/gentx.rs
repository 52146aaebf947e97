use crate::GenutilError;
use ed25519_dalek::SigningKey;
use mc_02_module::{Msg, SignerData, Tx, TxBuilder};
use mc_06_staking::{MsgCreateValidator, MSG_CREATE_VALIDATOR_TYPE_URL};
use serde::{Deserialize, Serialize};
use shared_types::{Coins, TxError};

/// Gas limit given to generated genesis transactions.
pub const GEN_TX_GAS_LIMIT: u64 = 400_000;

/// Genesis transactions, hex encoded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GenutilGenesisState {
    #[serde(default)]
    pub gen_txs: Vec<String>,
}

impl GenutilGenesisState {
    /// Decode every entry and check it carries exactly one
    /// `MsgCreateValidator`.
    pub fn decode_all(&self) -> Result<Vec<Vec<u8>>, GenutilError> {
        self.gen_txs
            .iter()
            .enumerate()
            .map(|(index, encoded)| {
                let malformed = |reason: String| GenutilError::Malformed { index, reason };
                let bytes = hex::decode(encoded).map_err(|e| malformed(e.to_string()))?;
                let tx = Tx::decode(&bytes).map_err(|e| malformed(e.log))?;
                match tx.body.messages.as_slice() {
                    [msg] if msg.type_url == MSG_CREATE_VALIDATOR_TYPE_URL => {
                        msg.decode::<MsgCreateValidator>()
                            .map_err(|e| malformed(e.log))?;
                        Ok(bytes)
                    }
                    _ => Err(malformed(
                        "must contain exactly one MsgCreateValidator".into(),
                    )),
                }
            })
            .collect()
    }
}

/// Sign a genesis transaction creating a validator.
///
/// Signed with account number and sequence 0, as no account numbers exist
/// before genesis runs.
pub fn build_gen_tx(
    chain_id: &str,
    key: &SigningKey,
    msg: &MsgCreateValidator,
) -> Result<String, TxError> {
    let tx = TxBuilder::new()
        .msg(Msg::new(MSG_CREATE_VALIDATOR_TYPE_URL, msg)?)
        .memo(msg.moniker.clone())
        .fee(Coins::empty(), GEN_TX_GAS_LIMIT)
        .sign(
            chain_id,
            &[SignerData {
                key,
                account_number: 0,
                sequence: 0,
            }],
        );
    Ok(hex::encode(tx.encode()))
}
