use crate::ParamsKeeper;
use mc_02_module::{AppModule, Context, Hook, QueryHandler};
use shared_types::{module_names, TxError};
use std::sync::Arc;

pub const CONSENSUS_VERSION: u64 = 1;

/// Serves `params/<subspace>` and `params/<subspace>/<key>`.
pub struct ParamsQuery {
    keeper: Arc<ParamsKeeper>,
}

impl ParamsQuery {
    pub fn new(keeper: Arc<ParamsKeeper>) -> Self {
        Self { keeper }
    }
}

impl QueryHandler for ParamsQuery {
    fn route(&self) -> &'static str {
        module_names::PARAMS
    }

    fn query(&self, ctx: &mut Context<'_>, path: &[&str], _data: &[u8]) -> Result<Vec<u8>, TxError> {
        let name = path
            .first()
            .ok_or_else(|| TxError::unknown_request("missing subspace"))?;
        let subspace = self
            .keeper
            .get_subspace(name)
            .ok_or_else(|| TxError::not_found(format!("subspace {name}")))?;
        let json = match path.get(1) {
            Some(key) => {
                if !subspace.registered_keys().iter().any(|k| *k == *key) {
                    return Err(TxError::not_found(format!("parameter {name}/{key}")));
                }
                serde_json::to_vec(&subspace.get(ctx, key)?)
            }
            None => serde_json::to_vec(&subspace.get_param_set(ctx)?),
        };
        json.map_err(|e| TxError::internal(e.to_string()))
    }
}

/// The params module: no genesis state of its own and no block work, but it
/// keeps its slot in every order.
pub fn app_module(keeper: Arc<ParamsKeeper>) -> AppModule {
    AppModule::new(module_names::PARAMS, CONSENSUS_VERSION)
        .with_genesis(Hook::NoOp)
        .with_begin_block(Hook::NoOp)
        .with_end_block(Hook::NoOp)
        .with_query_handler(Arc::new(ParamsQuery::new(keeper)))
}
