use crate::{
    MsgCreateValidator, MsgDelegate, MsgUndelegate, StakingError, StakingKeeper,
    MSG_CREATE_VALIDATOR_TYPE_URL, MSG_DELEGATE_TYPE_URL, MSG_UNDELEGATE_TYPE_URL,
};
use mc_02_module::{Context, MessageHandler, ModuleError, Msg, QueryHandler};
use serde_json::json;
use shared_types::{event_types as ev, module_names, Address, Coin, Event, TxError};
use std::sync::Arc;

pub struct StakingMsgHandler {
    keeper: Arc<StakingKeeper>,
}

impl StakingMsgHandler {
    pub fn new(keeper: Arc<StakingKeeper>) -> Self {
        Self { keeper }
    }

    fn check_denom(&self, ctx: &mut Context<'_>, coin: &Coin) -> Result<(), StakingError> {
        let expected = self.keeper.params(ctx)?.bond_denom;
        if coin.denom != expected {
            return Err(StakingError::InvalidBondDenom {
                expected,
                got: coin.denom.clone(),
            });
        }
        Ok(())
    }
}

fn require_address(address: &Address, what: &str) -> Result<(), TxError> {
    if address.is_zero() {
        return Err(TxError::invalid_address(format!("empty {what} address")));
    }
    Ok(())
}

fn require_amount(coin: &Coin) -> Result<(), TxError> {
    coin.validate()
        .map_err(|e| TxError::invalid_coins(e.to_string()))?;
    if coin.amount == 0 {
        return Err(TxError::invalid_coins("amount must be positive"));
    }
    Ok(())
}

impl MessageHandler for StakingMsgHandler {
    fn message_types(&self) -> Vec<&'static str> {
        vec![
            MSG_CREATE_VALIDATOR_TYPE_URL,
            MSG_DELEGATE_TYPE_URL,
            MSG_UNDELEGATE_TYPE_URL,
        ]
    }

    fn validate_basic(&self, msg: &Msg) -> Result<Vec<Address>, TxError> {
        match msg.type_url.as_str() {
            MSG_CREATE_VALIDATOR_TYPE_URL => {
                let m: MsgCreateValidator = msg.decode()?;
                require_address(&m.operator, "operator")?;
                require_amount(&m.value)?;
                Ok(vec![m.operator])
            }
            MSG_DELEGATE_TYPE_URL => {
                let m: MsgDelegate = msg.decode()?;
                require_address(&m.delegator, "delegator")?;
                require_address(&m.validator, "validator")?;
                require_amount(&m.amount)?;
                Ok(vec![m.delegator])
            }
            MSG_UNDELEGATE_TYPE_URL => {
                let m: MsgUndelegate = msg.decode()?;
                require_address(&m.delegator, "delegator")?;
                require_address(&m.validator, "validator")?;
                require_amount(&m.amount)?;
                Ok(vec![m.delegator])
            }
            other => Err(TxError::unknown_request(format!("staking cannot handle {other}"))),
        }
    }

    fn handle(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, ModuleError> {
        let (sender, data) = match msg.type_url.as_str() {
            MSG_CREATE_VALIDATOR_TYPE_URL => {
                let m: MsgCreateValidator = msg.decode()?;
                self.check_denom(ctx, &m.value)?;
                ctx.branch(|ctx| -> Result<(), StakingError> {
                    self.keeper
                        .create_validator(ctx, m.operator, m.pub_key, m.moniker.clone())?;
                    self.keeper
                        .delegate(ctx, &m.operator, &m.operator, m.value.amount)
                })?;
                (m.operator, Vec::new())
            }
            MSG_DELEGATE_TYPE_URL => {
                let m: MsgDelegate = msg.decode()?;
                self.check_denom(ctx, &m.amount)?;
                self.keeper
                    .delegate(ctx, &m.delegator, &m.validator, m.amount.amount)?;
                (m.delegator, Vec::new())
            }
            MSG_UNDELEGATE_TYPE_URL => {
                let m: MsgUndelegate = msg.decode()?;
                self.check_denom(ctx, &m.amount)?;
                let completion = self
                    .keeper
                    .undelegate(ctx, &m.delegator, &m.validator, m.amount.amount)?;
                (m.delegator, completion.to_be_bytes().to_vec())
            }
            other => {
                return Err(TxError::unknown_request(format!("staking cannot handle {other}")).into())
            }
        };
        ctx.emit(
            Event::new(ev::MESSAGE)
                .attr(ev::ATTR_MODULE, module_names::STAKING)
                .attr(ev::ATTR_SENDER, sender),
        );
        Ok(data)
    }
}

/// Serves `staking/validators`, `staking/validator/<operator>`,
/// `staking/delegations/<delegator>`, `staking/delegation/<delegator>/<validator>`,
/// `staking/unbonding`, `staking/historical/<height>`, `staking/pool` and
/// `staking/params`.
pub struct StakingQuery {
    keeper: Arc<StakingKeeper>,
}

impl StakingQuery {
    pub fn new(keeper: Arc<StakingKeeper>) -> Self {
        Self { keeper }
    }
}

fn parse_address(raw: &str) -> Result<Address, TxError> {
    raw.parse()
        .map_err(|e| TxError::invalid_address(format!("{raw}: {e}")))
}

impl QueryHandler for StakingQuery {
    fn route(&self) -> &'static str {
        module_names::STAKING
    }

    fn query(&self, ctx: &mut Context<'_>, path: &[&str], _data: &[u8]) -> Result<Vec<u8>, TxError> {
        let keeper = &self.keeper;
        let json = match path {
            ["validators"] => serde_json::to_vec(&keeper.validators(ctx)?),
            ["validator", operator] => {
                let operator = parse_address(operator)?;
                let validator = keeper
                    .get_validator(ctx, &operator)?
                    .ok_or_else(|| TxError::not_found(format!("validator {operator}")))?;
                serde_json::to_vec(&validator)
            }
            ["delegations", delegator] => {
                serde_json::to_vec(&keeper.delegations(ctx, Some(&parse_address(delegator)?))?)
            }
            ["delegation", delegator, validator] => {
                let delegator = parse_address(delegator)?;
                let validator = parse_address(validator)?;
                let delegation = keeper
                    .get_delegation(ctx, &delegator, &validator)?
                    .ok_or_else(|| {
                        TxError::not_found(format!("delegation {delegator} -> {validator}"))
                    })?;
                serde_json::to_vec(&delegation)
            }
            ["unbonding"] => serde_json::to_vec(&keeper.unbonding_entries(ctx)?),
            ["historical", height] => {
                let height: u64 = height
                    .parse()
                    .map_err(|_| TxError::invalid_request(format!("bad height {height}")))?;
                let info = keeper
                    .historical_info(ctx, height)?
                    .ok_or_else(|| TxError::not_found(format!("historical info at {height}")))?;
                serde_json::to_vec(&info)
            }
            ["pool"] => {
                let denom = keeper.params(ctx)?.bond_denom;
                let bonded = keeper.bank.balance(
                    ctx,
                    &Address::module(module_names::BONDED_POOL),
                    &denom,
                )?;
                let not_bonded = keeper.bank.balance(
                    ctx,
                    &Address::module(module_names::NOT_BONDED_POOL),
                    &denom,
                )?;
                serde_json::to_vec(&json!({
                    "bonded_tokens": bonded.to_string(),
                    "not_bonded_tokens": not_bonded.to_string(),
                }))
            }
            ["params"] => serde_json::to_vec(&keeper.params(ctx)?),
            _ => return Err(TxError::unknown_request(format!("staking/{}", path.join("/")))),
        };
        json.map_err(|e| TxError::internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::tests::{setup, DEL, VAL};
    use crate::STAKING_CODESPACE;
    use mc_02_module::{BlockHeader, ExecMode};
    use shared_types::PublicKey;

    fn create(amount: u128, denom: &str) -> Msg {
        Msg::new(
            MSG_CREATE_VALIDATOR_TYPE_URL,
            &MsgCreateValidator {
                operator: VAL,
                pub_key: PublicKey([9; 32]),
                moniker: "node0".into(),
                value: Coin::new(denom, amount),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_validate_basic_signers() {
        let (_, keeper, _) = setup();
        let handler = StakingMsgHandler::new(Arc::new(keeper));
        assert_eq!(handler.validate_basic(&create(1, "stake")).unwrap(), vec![VAL]);
        assert!(handler.validate_basic(&create(0, "stake")).is_err());
        let delegate = Msg::new(
            MSG_DELEGATE_TYPE_URL,
            &MsgDelegate {
                delegator: DEL,
                validator: VAL,
                amount: Coin::new("stake", 5),
            },
        )
        .unwrap();
        assert_eq!(handler.validate_basic(&delegate).unwrap(), vec![DEL]);
    }

    #[test]
    fn test_create_validator_self_delegates() {
        let (mut root, keeper, bank) = setup();
        bank.fund(VAL, 1_000);
        let keeper = Arc::new(keeper);
        let handler = StakingMsgHandler::new(keeper.clone());
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Deliver);
        handler.handle(&mut ctx, &create(600, "stake")).unwrap();
        let validator = keeper.get_validator(&mut ctx, &VAL).unwrap().unwrap();
        assert_eq!(validator.tokens, 600);
        assert_eq!(bank.balance_of(&VAL), 400);
        assert!(ctx.events().iter().any(|e| e.kind == ev::CREATE_VALIDATOR));
    }

    #[test]
    fn test_unfunded_create_validator_leaves_nothing() {
        let (mut root, keeper, _) = setup();
        let keeper = Arc::new(keeper);
        let handler = StakingMsgHandler::new(keeper.clone());
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Deliver);
        assert!(handler.handle(&mut ctx, &create(600, "stake")).is_err());
        assert!(keeper.get_validator(&mut ctx, &VAL).unwrap().is_none());
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn test_wrong_denom_is_rejected() {
        let (mut root, keeper, bank) = setup();
        bank.fund(VAL, 1_000);
        let handler = StakingMsgHandler::new(Arc::new(keeper));
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Deliver);
        let err: TxError = handler.handle(&mut ctx, &create(1, "atom")).unwrap_err().into();
        assert_eq!(err.codespace, STAKING_CODESPACE);
        assert_eq!(err.code, 14);
    }

    #[test]
    fn test_query_pool() {
        let (mut root, keeper, bank) = setup();
        bank.fund(Address::module(module_names::BONDED_POOL), 42);
        let query = StakingQuery::new(Arc::new(keeper));
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Query);
        let out = query.query(&mut ctx, &["pool"], &[]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["bonded_tokens"], "42");
        assert_eq!(value["not_bonded_tokens"], "0");
    }
}
