//! Command implementations.

use std::time::Duration;

use anyhow::{bail, Context as _};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ridepay_store::{DelegationStore, LocalStorage, StorageClient};
use ridepay_types::{Address, ScopeKind, SignedDelegation, SystemClock, Timestamp, TokenId};
use ridepay_utils::{format_allowance, format_duration, format_ether, parse_ether};
use ridepay_wallet_core::{
    load_account, prepare_redeem_delegation_data, save_account, AccountRole, DelegationConfig,
    RidePaymentExecutor, RidePreset, RpcBundlerClient, SmartAccount, SpendingLimits,
};

use crate::config::CliConfig;
use crate::simulator::{describe_scope, payable_delegations, Ride, RideOutcome, RideSimulator};

/// Form-style arguments of `delegation create`; amounts are decimal token
/// strings.
#[derive(Debug, Default)]
pub struct ScopeArgs {
    pub token: Option<Address>,
    pub token_id: Option<u128>,
    pub max_amount: Option<String>,
    pub period_amount: Option<String>,
    pub period_duration: Option<u64>,
    pub amount_per_second: Option<String>,
    pub initial_amount: Option<String>,
}

impl ScopeArgs {
    pub fn into_config(self, scope: ScopeKind) -> anyhow::Result<DelegationConfig> {
        let amount = |raw: Option<String>| raw.as_deref().map(parse_ether).transpose();
        let mut config = DelegationConfig::new(scope);
        config.token_address = self.token;
        config.token_id = self.token_id.map(TokenId);
        config.max_amount = amount(self.max_amount).context("--max-amount")?;
        config.period_amount = amount(self.period_amount).context("--period-amount")?;
        config.period_duration = self.period_duration;
        config.amount_per_second =
            amount(self.amount_per_second).context("--amount-per-second")?;
        config.initial_amount = amount(self.initial_amount).context("--initial-amount")?;
        Ok(config)
    }
}

/// Everything a command needs: settings and the opened storage.
pub struct Context<S> {
    pub config: CliConfig,
    pub storage: S,
}

impl<S: LocalStorage> Context<S> {
    pub fn new(config: CliConfig, storage: S) -> Self {
        Self { config, storage }
    }

    fn account(&self, role: AccountRole) -> anyhow::Result<SmartAccount> {
        load_account(&self.storage, role)?.with_context(|| {
            format!(
                "no {} account; create one with `ridepay account create`",
                role_name(role)
            )
        })
    }

    fn spending_limits(&self) -> anyhow::Result<SpendingLimits<&S>> {
        Ok(SpendingLimits::new(StorageClient::new(&self.storage))
            .with_delegator(self.account(AccountRole::Delegator)?)
            .with_delegate(self.account(AccountRole::Delegate)?.address()))
    }

    fn delegations(&self) -> anyhow::Result<Vec<SignedDelegation>> {
        Ok(StorageClient::new(&self.storage).get_delegations()?)
    }

    // ── account ─────────────────────────────────────────────────────────

    pub fn account_create(
        &self,
        role: AccountRole,
        private_key: Option<&str>,
        print_key: bool,
    ) -> anyhow::Result<()> {
        let mut limits: SpendingLimits<&S> = SpendingLimits::new(StorageClient::new(&self.storage));
        let account = limits.create_hybrid_smart_account(private_key, self.config.chain)?;
        save_account(&self.storage, role, &account)?;

        println!("{} smart account: {}", role_name(role), account.address());
        println!("signer: {}", account.signer_address());
        if print_key {
            println!("private key: {}", account.export_private_key());
        }
        Ok(())
    }

    pub fn account_show(&self) -> anyhow::Result<()> {
        for role in [AccountRole::Delegator, AccountRole::Delegate] {
            match load_account(&self.storage, role)? {
                Some(account) => println!(
                    "{:<9} {} (signer {}, {})",
                    role_name(role),
                    account.address(),
                    account.signer_address(),
                    account.environment().as_str()
                ),
                None => println!("{:<9} -", role_name(role)),
            }
        }
        Ok(())
    }

    // ── delegation ──────────────────────────────────────────────────────

    pub fn delegation_create(&self, scope: ScopeKind, args: ScopeArgs) -> anyhow::Result<()> {
        let config = args.into_config(scope)?;
        let signed = self
            .spending_limits()?
            .create_delegation(&config, Timestamp::now())?;
        print_delegation(0, &signed);
        Ok(())
    }

    pub fn delegation_preset(
        &self,
        preset: RidePreset,
        token: Option<Address>,
    ) -> anyhow::Result<()> {
        let token = token.unwrap_or(self.config.default_token);
        let signed = self
            .spending_limits()?
            .create_preset_delegation(preset, token, Timestamp::now())?;
        print_delegation(0, &signed);
        Ok(())
    }

    pub fn delegation_list(&self) -> anyhow::Result<()> {
        let delegations = self.delegations()?;
        if delegations.is_empty() {
            println!("No delegations available. Create a delegation first.");
        }
        for (i, d) in delegations.iter().enumerate() {
            print_delegation(i, d);
        }
        Ok(())
    }

    // ── ride ────────────────────────────────────────────────────────────

    pub async fn ride_simulate(
        &self,
        index: usize,
        rides: usize,
        revoke_after: Option<usize>,
        seed: Option<u64>,
    ) -> anyhow::Result<()> {
        let payable = payable_delegations(self.delegations()?);
        let delegation = pick(&payable, index)?;

        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut sim = RideSimulator::new(
            SystemClock,
            Duration::from_millis(self.config.processing_delay_ms),
        );
        sim.select(delegation);

        for n in 0..rides {
            if revoke_after == Some(n) {
                sim.revoke();
            }
            let ride = Ride::random(&mut rng, self.config.recipient);
            if sim.pay(&ride).await == RideOutcome::Declined {
                tracing::debug!(ride = n, "ride declined");
            }
        }

        tracing::debug!(summary = ?sim.monitor().summary(), "simulation finished");
        for line in sim.log() {
            println!("{line}");
        }
        if let Some(usage) = sim.usage() {
            println!(
                "status {} | spent {} | remaining {}",
                usage.status,
                format_ether(usage.total_spent),
                format_allowance(usage.remaining_allowance)
            );
            if let Some(reset) = usage.period_reset_time {
                let left = Timestamp::now().until(reset);
                println!("next reset in {}", format_duration(left));
            }
            println!("{}", serde_json::to_string_pretty(usage)?);
        }
        Ok(())
    }

    pub async fn ride_pay(&self, index: usize, recipient: Option<Address>) -> anyhow::Result<()> {
        let Some(url) = self.config.bundler_url.as_deref() else {
            bail!("no bundler configured; set bundler_url or RIDEPAY_BUNDLER_URL");
        };
        let delegations = self.delegations()?;
        let delegation = pick(&delegations, index)?;
        let sender = self.account(AccountRole::Delegate)?.address();
        let recipient = recipient.unwrap_or(self.config.recipient);

        let mut executor = RidePaymentExecutor::new(RpcBundlerClient::new(url)?, sender);
        if let Some(paymaster) = &self.config.paymaster_url {
            executor = executor.with_paymaster(paymaster.clone());
        }
        let receipt = executor.execute_payment(delegation, recipient).await?;
        println!("Payment executed!");
        println!("user operation: {}", receipt.user_op_hash);
        println!("transaction:    {}", receipt.transaction_hash);
        Ok(())
    }

    pub fn redeem_data(&self, index: usize) -> anyhow::Result<String> {
        let delegations = self.delegations()?;
        let data = prepare_redeem_delegation_data(pick(&delegations, index)?)?;
        Ok(data.to_string())
    }
}

fn pick(delegations: &[SignedDelegation], index: usize) -> anyhow::Result<&SignedDelegation> {
    if delegations.is_empty() {
        bail!("no delegations available; create a delegation first");
    }
    delegations.get(index).with_context(|| {
        format!(
            "no delegation at index {index} ({} available)",
            delegations.len()
        )
    })
}

fn role_name(role: AccountRole) -> &'static str {
    match role {
        AccountRole::Delegator => "delegator",
        AccountRole::Delegate => "delegate",
    }
}

fn print_delegation(index: usize, d: &SignedDelegation) {
    println!(
        "[{index}] {} -> {} | {} | {}",
        d.delegator(),
        d.delegate(),
        d.scope().kind().payment_label(),
        describe_scope(d)
    );
}
