use crate::{Account, AuthError, AuthParams, BaseAccount, ModuleAccount};
use mc_01_store::StoreKey;
use mc_02_module::{Context, KeeperInfo};
use mc_03_params::Subspace;
use shared_types::{module_names, Address, FatalError, ModuleAccountPermissions, Permission, PublicKey};
use std::collections::BTreeSet;
use tracing::debug;

const ACCOUNT_PREFIX: u8 = 0x01;
const NEXT_ACCOUNT_NUMBER_KEY: &[u8] = &[0x02];

fn account_key(address: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + address.as_bytes().len());
    key.push(ACCOUNT_PREFIX);
    key.extend_from_slice(address.as_bytes());
    key
}

/// Sole owner of the `auth` partition.
pub struct AuthKeeper {
    store: StoreKey,
    subspace: Subspace,
    permissions: ModuleAccountPermissions,
}

impl AuthKeeper {
    /// Bind the auth key table to `subspace` and take ownership of `store`.
    pub fn new(
        store: StoreKey,
        subspace: Subspace,
        permissions: ModuleAccountPermissions,
    ) -> Result<Self, FatalError> {
        let subspace = if subspace.has_key_table() {
            subspace
        } else {
            subspace.with_key_table(AuthParams::key_table())?
        };
        Ok(Self {
            store,
            subspace,
            permissions,
        })
    }

    pub fn keeper_info() -> KeeperInfo {
        KeeperInfo::new(module_names::AUTH, &[module_names::PARAMS])
    }

    pub fn params(&self, ctx: &mut Context<'_>) -> Result<AuthParams, AuthError> {
        AuthParams::load(&self.subspace, ctx)
    }

    pub fn set_params(&self, ctx: &mut Context<'_>, params: &AuthParams) -> Result<(), AuthError> {
        Ok(self.subspace.set_param_set(ctx, &params.pairs())?)
    }

    pub fn get_account(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
    ) -> Result<Option<Account>, AuthError> {
        Ok(ctx.kv(&self.store).get_typed(&account_key(address))?)
    }

    pub fn has_account(&self, ctx: &mut Context<'_>, address: &Address) -> Result<bool, AuthError> {
        Ok(ctx.kv(&self.store).has(&account_key(address))?)
    }

    pub fn set_account(&self, ctx: &mut Context<'_>, account: &Account) -> Result<(), AuthError> {
        Ok(ctx
            .kv(&self.store)
            .set_typed(&account_key(&account.address()), account)?)
    }

    pub fn remove_account(&self, ctx: &mut Context<'_>, address: &Address) -> Result<(), AuthError> {
        Ok(ctx.kv(&self.store).delete(&account_key(address))?)
    }

    /// Return the next account number and advance the counter.
    pub fn next_account_number(&self, ctx: &mut Context<'_>) -> Result<u64, AuthError> {
        let mut kv = ctx.kv(&self.store);
        let next: u64 = kv.get_typed(NEXT_ACCOUNT_NUMBER_KEY)?.unwrap_or(0);
        kv.set_typed(NEXT_ACCOUNT_NUMBER_KEY, &(next + 1))?;
        Ok(next)
    }

    pub(crate) fn ensure_account_number_above(
        &self,
        ctx: &mut Context<'_>,
        floor: u64,
    ) -> Result<(), AuthError> {
        let mut kv = ctx.kv(&self.store);
        let next: u64 = kv.get_typed(NEXT_ACCOUNT_NUMBER_KEY)?.unwrap_or(0);
        if next < floor {
            kv.set_typed(NEXT_ACCOUNT_NUMBER_KEY, &floor)?;
        }
        Ok(())
    }

    /// Create and store a base account for `address` if none exists.
    pub fn ensure_account(&self, ctx: &mut Context<'_>, address: &Address) -> Result<Account, AuthError> {
        if let Some(account) = self.get_account(ctx, address)? {
            return Ok(account);
        }
        let number = self.next_account_number(ctx)?;
        let account = Account::Base(BaseAccount::new(*address, number));
        self.set_account(ctx, &account)?;
        debug!(address = %address, number, "[Auth] account created");
        Ok(account)
    }

    pub fn module_permissions(&self, name: &str) -> Option<&BTreeSet<Permission>> {
        self.permissions.get(name)
    }

    /// Address of the module account for `name`.
    pub fn module_address(&self, name: &str) -> Result<Address, AuthError> {
        if self.permissions.contains_key(name) {
            Ok(Address::module(name))
        } else {
            Err(AuthError::MissingModulePermission(name.to_string()))
        }
    }

    /// Addresses of every module account in the permission table, sorted.
    pub fn module_account_addresses(&self) -> BTreeSet<Address> {
        self.permissions.keys().map(|n| Address::module(n)).collect()
    }

    /// Fetch the module account for `name`, creating it on first use.
    ///
    /// Fails if `name` has no permission table entry, or if a base account
    /// already occupies the derived address.
    pub fn get_module_account(
        &self,
        ctx: &mut Context<'_>,
        name: &str,
    ) -> Result<ModuleAccount, AuthError> {
        let permissions = self
            .permissions
            .get(name)
            .ok_or_else(|| AuthError::MissingModulePermission(name.to_string()))?;
        let address = Address::module(name);
        match self.get_account(ctx, &address)? {
            Some(Account::Module(m)) => Ok(m),
            Some(Account::Base(_)) => Err(AuthError::InvalidGenesis(format!(
                "address {address} of module {name} is held by a base account"
            ))),
            None => {
                let number = self.next_account_number(ctx)?;
                let account = ModuleAccount {
                    base: BaseAccount::new(address, number),
                    name: name.to_string(),
                    permissions: permissions.iter().copied().collect(),
                };
                self.set_account(ctx, &Account::Module(account.clone()))?;
                debug!(module = name, address = %address, "[Auth] module account created");
                Ok(account)
            }
        }
    }

    /// Attach `pub_key` to a base account, checking it derives the address.
    pub fn set_pub_key(
        &self,
        ctx: &mut Context<'_>,
        address: &Address,
        pub_key: PublicKey,
    ) -> Result<(), AuthError> {
        if Address::from_pubkey(&pub_key) != *address {
            return Err(AuthError::PubKeyMismatch(*address));
        }
        let mut account = self
            .get_account(ctx, address)?
            .ok_or(AuthError::UnknownAddress(*address))?;
        if account.as_module().is_some() {
            return Err(AuthError::ModuleAccountSigner { address: *address });
        }
        account.base_mut().pub_key = Some(pub_key);
        self.set_account(ctx, &account)
    }

    pub fn increment_sequence(&self, ctx: &mut Context<'_>, address: &Address) -> Result<u64, AuthError> {
        let mut account = self
            .get_account(ctx, address)?
            .ok_or(AuthError::UnknownAddress(*address))?;
        let base = account.base_mut();
        base.sequence += 1;
        let sequence = base.sequence;
        self.set_account(ctx, &account)?;
        Ok(sequence)
    }

    /// Every stored account, ordered by address.
    pub fn accounts(&self, ctx: &mut Context<'_>) -> Result<Vec<Account>, AuthError> {
        ctx.kv(&self.store)
            .iter_prefix(&[ACCOUNT_PREFIX])?
            .into_iter()
            .map(|(_, v)| mc_01_store::decode(&v).map_err(|e| AuthError::Module(e.into())))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use mc_01_store::{InMemoryVersionedStore, MultiStore, PartitionManager, StoreKind};
    use mc_02_module::{BlockHeader, ExecMode};
    use mc_03_params::ParamsKeeper;

    pub(crate) fn permissions() -> ModuleAccountPermissions {
        let mut perms = ModuleAccountPermissions::new();
        perms.insert(module_names::FEE_COLLECTOR.into(), BTreeSet::new());
        perms.insert(
            module_names::BONDED_POOL.into(),
            [Permission::Burner, Permission::Staking].into(),
        );
        perms
    }

    pub(crate) fn setup() -> (MultiStore, AuthKeeper) {
        let mut pm = PartitionManager::new();
        let auth = pm.allocate_one(StoreKind::Persistent, "auth").unwrap();
        let params = ParamsKeeper::new(
            pm.allocate_one(StoreKind::Persistent, "params").unwrap(),
            pm.allocate_one(StoreKind::Transient, "transient_params").unwrap(),
        );
        let keeper = AuthKeeper::new(auth, params.subspace("auth").unwrap(), permissions()).unwrap();
        let root = MultiStore::new(Box::new(InMemoryVersionedStore::new()), pm.seal()).unwrap();
        (root, keeper)
    }

    #[test]
    fn test_account_numbers_are_sequential() {
        let (mut root, keeper) = setup();
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Deliver);
        let a = keeper.ensure_account(&mut ctx, &Address([1; 20])).unwrap();
        let b = keeper.ensure_account(&mut ctx, &Address([2; 20])).unwrap();
        let again = keeper.ensure_account(&mut ctx, &Address([1; 20])).unwrap();
        assert_eq!((a.account_number(), b.account_number()), (0, 1));
        assert_eq!(again, a);
    }

    #[test]
    fn test_module_account_requires_permission_entry() {
        let (mut root, keeper) = setup();
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Deliver);
        let pool = keeper
            .get_module_account(&mut ctx, module_names::BONDED_POOL)
            .unwrap();
        assert!(pool.has_permission(Permission::Burner));
        assert!(pool.has_permission(Permission::Staking));
        assert!(!pool.has_permission(Permission::Minter));
        assert_eq!(pool.base.address, Address::module(module_names::BONDED_POOL));

        let err = keeper.get_module_account(&mut ctx, "mint").unwrap_err();
        assert!(matches!(err, AuthError::MissingModulePermission(_)));
        let module_err: mc_02_module::ModuleError = err.into();
        assert!(matches!(
            module_err,
            mc_02_module::ModuleError::Fatal(FatalError::MissingModulePermission { .. })
        ));
    }

    #[test]
    fn test_set_pub_key_checks_address() {
        let (mut root, keeper) = setup();
        let mut ctx = Context::new(&mut root, BlockHeader::default(), ExecMode::Deliver);
        let pk = PublicKey([7; 32]);
        let addr = Address::from_pubkey(&pk);
        keeper.ensure_account(&mut ctx, &addr).unwrap();
        assert!(matches!(
            keeper.set_pub_key(&mut ctx, &addr, PublicKey([8; 32])),
            Err(AuthError::PubKeyMismatch(_))
        ));
        keeper.set_pub_key(&mut ctx, &addr, pk).unwrap();
        assert_eq!(keeper.increment_sequence(&mut ctx, &addr).unwrap(), 1);
        let account = keeper.get_account(&mut ctx, &addr).unwrap().unwrap();
        assert_eq!(account.pub_key(), Some(pk));
        assert_eq!(account.sequence(), 1);
    }

    #[test]
    fn test_blocked_addresses_cover_permission_table() {
        let (_, keeper) = setup();
        let blocked = keeper.module_account_addresses();
        assert!(blocked.contains(&Address::module(module_names::FEE_COLLECTOR)));
        assert_eq!(blocked.len(), 2);
    }
}
