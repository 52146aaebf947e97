use mc_02_module::{AppModule, Context, MessageHandler, ModuleError, Msg, MsgValidator, QueryHandler};
use shared_types::{event_types as ev, Address, Event, FatalError, TxError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Routes messages to their owning module by type URL.
pub struct MsgRouter {
    routes: BTreeMap<&'static str, (String, Arc<dyn MessageHandler>)>,
}

impl MsgRouter {
    /// Collect every module's message handler. Two modules claiming one
    /// type URL is a start-up error.
    pub fn new<'a>(modules: impl IntoIterator<Item = &'a AppModule>) -> Result<Self, FatalError> {
        let mut routes = BTreeMap::new();
        for module in modules {
            let Some(handler) = &module.msg_handler else {
                continue;
            };
            for type_url in handler.message_types() {
                if let Some((owner, _)) =
                    routes.insert(type_url, (module.name.clone(), handler.clone()))
                {
                    return Err(FatalError::Config(format!(
                        "message type {type_url} registered by both {owner} and {}",
                        module.name
                    )));
                }
            }
        }
        debug!(routes = routes.len(), "[Router] message routes registered");
        Ok(Self { routes })
    }

    pub fn message_types(&self) -> Vec<&'static str> {
        self.routes.keys().copied().collect()
    }

    fn route(&self, type_url: &str) -> Result<&(String, Arc<dyn MessageHandler>), TxError> {
        self.routes
            .get(type_url)
            .ok_or_else(|| TxError::unknown_request(format!("unrecognized message type: {type_url}")))
    }

    /// Execute one message. The `message` event naming the action precedes
    /// the handler's own events.
    pub fn handle(&self, ctx: &mut Context<'_>, msg: &Msg) -> Result<Vec<u8>, ModuleError> {
        let (module, handler) = self.route(&msg.type_url)?;
        ctx.emit(
            Event::new(ev::MESSAGE)
                .attr(ev::ATTR_ACTION, &msg.type_url)
                .attr(ev::ATTR_MODULE, module),
        );
        handler.handle(ctx, msg)
    }
}

impl MsgValidator for MsgRouter {
    fn validate_msg(&self, msg: &Msg) -> Result<Vec<Address>, TxError> {
        self.route(&msg.type_url)?.1.validate_basic(msg)
    }
}

/// Routes `<route>/<rest...>` paths to query handlers.
pub struct QueryRouter {
    routes: BTreeMap<&'static str, Arc<dyn QueryHandler>>,
}

impl QueryRouter {
    pub fn new<'a>(modules: impl IntoIterator<Item = &'a AppModule>) -> Result<Self, FatalError> {
        let mut routes = BTreeMap::new();
        for module in modules {
            let Some(handler) = &module.query_handler else {
                continue;
            };
            if routes.insert(handler.route(), handler.clone()).is_some() {
                return Err(FatalError::Config(format!(
                    "query route {} registered twice",
                    handler.route()
                )));
            }
        }
        Ok(Self { routes })
    }

    pub fn routes(&self) -> Vec<&'static str> {
        self.routes.keys().copied().collect()
    }

    pub fn query(&self, ctx: &mut Context<'_>, path: &str, data: &[u8]) -> Result<Vec<u8>, TxError> {
        let segments: Vec<&str> = path
            .trim_matches('/')
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();
        let Some((route, rest)) = segments.split_first() else {
            return Err(TxError::unknown_request("empty query path"));
        };
        let handler = self
            .routes
            .get(*route)
            .ok_or_else(|| TxError::unknown_request(format!("unknown query route: {route}")))?;
        handler.query(ctx, rest, data)
    }
}
