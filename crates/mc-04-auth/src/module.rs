use crate::{AuthGenesis, AuthKeeper};
use mc_02_module::{AppModule, Context, Hook, QueryHandler};
use shared_types::{module_names, Address, TxError};
use std::sync::Arc;

pub const CONSENSUS_VERSION: u64 = 2;

/// Serves `auth/account/<address>`, `auth/module_account/<name>` and
/// `auth/params`.
pub struct AuthQuery {
    keeper: Arc<AuthKeeper>,
}

impl QueryHandler for AuthQuery {
    fn route(&self) -> &'static str {
        module_names::AUTH
    }

    fn query(&self, ctx: &mut Context<'_>, path: &[&str], _data: &[u8]) -> Result<Vec<u8>, TxError> {
        let json = match path {
            ["account", address] => {
                let address: Address = address
                    .parse()
                    .map_err(|e| TxError::invalid_address(format!("{address}: {e}")))?;
                let account = self
                    .keeper
                    .get_account(ctx, &address)?
                    .ok_or_else(|| TxError::not_found(format!("account {address}")))?;
                serde_json::to_vec(&account)
            }
            ["module_account", name] => {
                let address = self.keeper.module_address(name)?;
                let account = self
                    .keeper
                    .get_account(ctx, &address)?
                    .ok_or_else(|| TxError::not_found(format!("module account {name}")))?;
                serde_json::to_vec(&account)
            }
            ["params"] => serde_json::to_vec(&self.keeper.params(ctx)?),
            _ => return Err(TxError::unknown_request(format!("auth/{}", path.join("/")))),
        };
        json.map_err(|e| TxError::internal(e.to_string()))
    }
}

pub fn app_module(keeper: Arc<AuthKeeper>) -> AppModule {
    AppModule::new(module_names::AUTH, CONSENSUS_VERSION)
        .with_genesis(Hook::Active(Arc::new(AuthGenesis::new(keeper.clone()))))
        .with_begin_block(Hook::NoOp)
        .with_end_block(Hook::NoOp)
        .with_query_handler(Arc::new(AuthQuery { keeper }))
}
