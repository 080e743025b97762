use std::{fmt, sync::Arc};

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use crate::provider::{Account, AccountDirectory, AccountStatus, Session};

/// Token in a role template replaced by each member account's id.
pub const ACCOUNT_PLACEHOLDER: &str = "<member-account-id>";

/// Role identifier assumed in every member account.
///
/// `arn:aws:iam::<member-account-id>:role/SecAuditReadOnly` renders to a
/// different role per account. A template without the placeholder renders to
/// the same literal role for every account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTemplate(String);

impl RoleTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn is_account_scoped(&self) -> bool {
        self.0.contains(ACCOUNT_PLACEHOLDER)
    }

    pub fn render(&self, account_id: &str) -> String {
        self.0.replace(ACCOUNT_PLACEHOLDER, account_id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoleTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One account the walker will open a session for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkTarget {
    /// The caller's own identity.
    Seed,
    /// A member account reached through a role exchange.
    Member { account_id: String, role_arn: String },
}

impl WalkTarget {
    pub fn label(&self) -> &str {
        match self {
            WalkTarget::Seed => "seed",
            WalkTarget::Member { account_id, .. } => account_id,
        }
    }
}

/// Why an account produced no session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Inactive(AccountStatus),
    AssumeRoleFailed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Inactive(status) => write!(f, "account status {status:?}"),
            SkipReason::AssumeRoleFailed(cause) => write!(f, "role assumption failed: {cause}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedAccount {
    pub account_id: String,
    pub reason: SkipReason,
}

/// Accounts to visit, plus those filtered out before any exchange.
#[derive(Debug, Default)]
pub struct WalkPlan {
    pub targets: Vec<WalkTarget>,
    pub skipped: Vec<SkippedAccount>,
}

/// Every session produced by a complete walk.
#[derive(Default)]
pub struct AccountWalk {
    pub sessions: Vec<Arc<dyn Session>>,
    pub skipped: Vec<SkippedAccount>,
}

/// Turns the seed identity into one session per eligible account.
///
/// Sessions are opened lazily through [`AccountWalker::open`] so temporary
/// credentials are only held while their account is being enumerated.
pub struct AccountWalker {
    seed: Arc<dyn Session>,
    multi_account: bool,
    role: Option<RoleTemplate>,
    session_name: String,
}

impl AccountWalker {
    pub fn new(
        seed: Arc<dyn Session>,
        multi_account: bool,
        role: Option<RoleTemplate>,
        session_name: impl Into<String>,
    ) -> Self {
        Self { seed, multi_account, role, session_name: session_name.into() }
    }

    /// Resolves the accounts to visit.
    ///
    /// In multi-account mode the directory listing must succeed; only `ACTIVE`
    /// accounts become targets.
    pub async fn plan(&self) -> Result<WalkPlan> {
        if !self.multi_account {
            return Ok(WalkPlan { targets: vec![WalkTarget::Seed], skipped: Vec::new() });
        }

        let Some(role) = &self.role else {
            bail!("Multi-account enumeration requires a role to assume");
        };
        if !role.is_account_scoped() {
            warn!(
                "Role template {role} has no {ACCOUNT_PLACEHOLDER} placeholder; \
                 the same role will be assumed for every account"
            );
        }

        let directory = self.seed.directory();
        let accounts = list_accounts(directory.as_ref())
            .await
            .context("Failed to list organization accounts")?;
        info!("Found {} organization accounts", accounts.len());

        let mut plan = WalkPlan::default();
        for account in accounts {
            if account.status != AccountStatus::Active {
                debug!("Skipping account {} ({:?})", account.id, account.status);
                plan.skipped.push(SkippedAccount {
                    account_id: account.id,
                    reason: SkipReason::Inactive(account.status),
                });
                continue;
            }
            let role_arn = role.render(&account.id);
            plan.targets.push(WalkTarget::Member { account_id: account.id, role_arn });
        }
        Ok(plan)
    }

    /// Opens the session for one target. Never yields a partial session.
    pub async fn open(&self, target: &WalkTarget) -> Result<Arc<dyn Session>> {
        match target {
            WalkTarget::Seed => Ok(self.seed.clone()),
            WalkTarget::Member { role_arn, .. } => {
                self.seed.assume_role(role_arn, &self.session_name).await
            }
        }
    }

    /// Opens one target, turning a failed exchange into its skip record.
    pub async fn open_or_skip(&self, target: &WalkTarget) -> Result<Arc<dyn Session>, SkippedAccount> {
        self.open(target).await.map_err(|err| {
            warn!("Skipping account {}: {err:#}", target.label());
            SkippedAccount {
                account_id: target.label().to_string(),
                reason: SkipReason::AssumeRoleFailed(format!("{err:#}")),
            }
        })
    }

    /// Plans and opens every session up front. A failed exchange skips its
    /// account.
    pub async fn sessions(&self) -> Result<AccountWalk> {
        let plan = self.plan().await?;
        let mut walk = AccountWalk { sessions: Vec::new(), skipped: plan.skipped };
        for target in &plan.targets {
            match self.open_or_skip(target).await {
                Ok(session) => walk.sessions.push(session),
                Err(skipped) => walk.skipped.push(skipped),
            }
        }
        Ok(walk)
    }
}

/// Drains every page of the account directory.
pub async fn list_accounts(directory: &dyn AccountDirectory) -> Result<Vec<Account>> {
    let mut accounts = Vec::new();
    let mut next = None;
    loop {
        let page = directory.list_accounts(next).await?;
        accounts.extend(page.items);
        match page.next {
            Some(token) => next = Some(token),
            None => break,
        }
    }
    Ok(accounts)
}
