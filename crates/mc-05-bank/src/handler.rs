use crate::{BankError, BankKeeper, MsgSend, MSG_SEND_TYPE_URL};
use mc_02_module::{Context, MessageHandler, ModuleError, Msg, QueryHandler};
use shared_types::{event_types as ev, module_names, Address, Coin, Event, TxError};
use std::sync::Arc;

pub struct BankMsgHandler {
    keeper: Arc<BankKeeper>,
}

impl BankMsgHandler {
    pub fn new(keeper: Arc<BankKeeper>) -> Self {
        Self { keeper }
    }
}

impl MessageHandler for BankMsgHandler {
    fn message_types(&self) -> Vec<&'static str> {
        vec![MSG_SEND_TYPE_URL]
    }

    fn validate_basic(&self, msg: &Msg) -> Result<Vec<Address>, TxError> {
        let send: MsgSend = msg.decode()?;
        if send.from_address.is_zero() {
            return Err(TxError::invalid_address("empty sender"));
        }
        if send.to_address.is_zero() {
            return Err(TxError::invalid_address("empty recipient"));
        }
        if send.amount.is_empty() {
            return Err(TxError::invalid_coins("empty amount"));
        }
        Ok(vec![send.from_address])
    }

    fn handle(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, ModuleError> {
        let send: MsgSend = msg.decode()?;
        if !self.keeper.params(ctx)?.default_send_enabled {
            return Err(BankError::SendDisabled.into());
        }
        if self.keeper.is_blocked(&send.to_address) {
            return Err(BankError::Blocked(send.to_address).into());
        }
        self.keeper
            .send_coins(ctx, &send.from_address, &send.to_address, &send.amount)?;
        ctx.emit(
            Event::new(ev::MESSAGE)
                .attr(ev::ATTR_MODULE, module_names::BANK)
                .attr(ev::ATTR_SENDER, send.from_address),
        );
        Ok(Vec::new())
    }
}

/// Serves `bank/balance/<address>/<denom>`, `bank/balances/<address>`,
/// `bank/supply[/<denom>]` and `bank/params`.
pub struct BankQuery {
    keeper: Arc<BankKeeper>,
}

impl BankQuery {
    pub fn new(keeper: Arc<BankKeeper>) -> Self {
        Self { keeper }
    }
}

fn parse_address(raw: &str) -> Result<Address, TxError> {
    raw.parse()
        .map_err(|e| TxError::invalid_address(format!("{raw}: {e}")))
}

impl QueryHandler for BankQuery {
    fn route(&self) -> &'static str {
        module_names::BANK
    }

    fn query(&self, ctx: &mut Context<'_>, path: &[&str], _data: &[u8]) -> Result<Vec<u8>, TxError> {
        let json = match path {
            ["balance", address, denom] => {
                let amount = self.keeper.get_balance(ctx, &parse_address(address)?, denom)?;
                serde_json::to_vec(&Coin::new(*denom, amount))
            }
            ["balances", address] => {
                serde_json::to_vec(&self.keeper.get_all_balances(ctx, &parse_address(address)?)?)
            }
            ["supply"] => serde_json::to_vec(&self.keeper.get_total_supply(ctx)?),
            ["supply", denom] => {
                let amount = self.keeper.get_supply(ctx, denom)?;
                serde_json::to_vec(&Coin::new(*denom, amount))
            }
            ["params"] => serde_json::to_vec(&self.keeper.params(ctx)?),
            _ => return Err(TxError::unknown_request(format!("bank/{}", path.join("/")))),
        };
        json.map_err(|e| TxError::internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keeper::tests::setup;
    use crate::BankParams;
    use mc_02_module::{BlockHeader, ExecMode};
    use shared_types::Coins;

    const A: Address = Address([0xA; 20]);
    const B: Address = Address([0xB; 20]);

    fn send(from: Address, to: Address, amount: &str) -> Msg {
        let amount: Coins = amount.parse().unwrap();
        Msg::new(
            MSG_SEND_TYPE_URL,
            &MsgSend {
                from_address: from,
                to_address: to,
                amount,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_validate_basic_returns_sender() {
        let (_, keeper, _) = setup();
        let handler = BankMsgHandler::new(Arc::new(keeper));
        assert_eq!(handler.validate_basic(&send(A, B, "1stake")).unwrap(), vec![A]);
        assert!(handler.validate_basic(&send(Address::default(), B, "1stake")).is_err());
        assert!(handler.validate_basic(&send(A, B, "")).is_err());
    }

    #[test]
    fn test_handle_respects_send_enabled() {
        let (mut root, keeper, _) = setup();
        let keeper = Arc::new(keeper);
        let handler = BankMsgHandler::new(keeper.clone());
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Deliver);
        keeper.set_balances(&mut ctx, &A, &"100stake".parse().unwrap()).unwrap();

        keeper
            .set_params(&mut ctx, &BankParams { default_send_enabled: false })
            .unwrap();
        let err: TxError = handler.handle(&mut ctx, &send(A, B, "1stake")).unwrap_err().into();
        assert_eq!(err.codespace, crate::BANK_CODESPACE);

        keeper.set_params(&mut ctx, &BankParams::default()).unwrap();
        handler.handle(&mut ctx, &send(A, B, "1stake")).unwrap();
        assert_eq!(keeper.get_balance(&mut ctx, &B, "stake").unwrap(), 1);
    }

    #[test]
    fn test_query_balance() {
        let (mut root, keeper, _) = setup();
        let keeper = Arc::new(keeper);
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Query);
        keeper.set_balances(&mut ctx, &A, &"7stake".parse().unwrap()).unwrap();
        let query = BankQuery::new(keeper);
        let a = A.to_string();
        let out = query.query(&mut ctx, &["balance", &a, "stake"], &[]).unwrap();
        assert_eq!(out, br#"{"denom":"stake","amount":"7"}"#.to_vec());
        assert!(query.query(&mut ctx, &["balance", "zz", "stake"], &[]).is_err());
    }
}
