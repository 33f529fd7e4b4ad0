//! Action sentence composition.
//!
//! [`compose_message`] holds one exhaustive `match` over [`ProtocolAction`].
//! Every arm either renders its template or fails; there is no fallback
//! text.

use tracing::debug;

use dotbit_address::{AddressFormat, ChainAddress};
use dotbit_types::{Cell, ContractName, Script, Transaction};

use crate::action::ProtocolAction;
use crate::aggregate::GroupedAmounts;
use crate::classify::SubjectFacts;
use crate::error::CompileError;
use crate::formatter::ScriptAddressFormatter;
use crate::numeric::{capacity_to_str, dp_to_str};
use crate::token::{is_token_cell, TokenMapProvider};
use crate::witness::{AccountApproval, DataType, TransferApprovalParams, WitnessDecoder};

/// Everything an action sentence may draw on.
pub struct DispatchContext<'a> {
    pub tx: &'a Transaction,
    /// Cells spent by the inputs, in input order.
    pub input_cells: &'a [Cell],
    pub facts: &'a SubjectFacts,
    pub format: &'a AddressFormat,
    pub decoder: &'a dyn WitnessDecoder,
    pub script_formatter: &'a dyn ScriptAddressFormatter,
    pub token_map: &'a dyn TokenMapProvider,
}

pub async fn compose_message(
    action: ProtocolAction,
    ctx: &DispatchContext<'_>,
) -> Result<String, CompileError> {
    debug!(%action, "composing message");
    let message = match action {
        ProtocolAction::Transfer | ProtocolAction::WithdrawFromWallet => ctx.transfer_message()?,
        ProtocolAction::TransferAccount => {
            let account_cell = ctx.decoder.account_cell(ctx.tx, DataType::New)?;
            let output = ctx.tx.outputs.get(account_cell.index).ok_or_else(|| {
                CompileError::missing(
                    "account cell output",
                    format!("no output at index {}", account_cell.index),
                )
            })?;
            format!(
                "TRANSFER THE ACCOUNT {} TO {}",
                ctx.facts.account()?,
                ctx.owner_normal(&output.lock.args)?
            )
        }
        ProtocolAction::EditManager => {
            format!("EDIT MANAGER OF ACCOUNT {}", ctx.facts.account()?)
        }
        ProtocolAction::EditRecords => {
            format!("EDIT RECORDS OF ACCOUNT {}", ctx.facts.account()?)
        }
        ProtocolAction::StartAccountSale => format!(
            "SELL {} FOR {} CKB",
            ctx.facts.account()?,
            capacity_to_str(ctx.facts.sale_price()?)
        ),
        ProtocolAction::EditAccountSale => format!(
            "EDIT SALE INFO, CURRENT PRICE IS {} CKB",
            capacity_to_str(ctx.facts.sale_price()?)
        ),
        ProtocolAction::CancelAccountSale => format!("CANCEL SALE OF {}", ctx.facts.account()?),
        ProtocolAction::BuyAccount => format!(
            "BUY {} WITH {} CKB",
            ctx.facts.account()?,
            capacity_to_str(ctx.facts.sale_price()?)
        ),
        ProtocolAction::MakeOffer => {
            let offer = ctx.decoder.offer_cell(ctx.tx, DataType::New)?;
            format!(
                "MAKE AN OFFER ON {} WITH {} CKB",
                offer.account,
                capacity_to_str(offer.price)
            )
        }
        ProtocolAction::EditOffer => {
            let old = ctx.decoder.offer_cell(ctx.tx, DataType::Old)?;
            let new = ctx.decoder.offer_cell(ctx.tx, DataType::New)?;
            format!(
                "CHANGE THE OFFER ON {} FROM {} CKB TO {} CKB",
                new.account,
                capacity_to_str(old.price),
                capacity_to_str(new.price)
            )
        }
        ProtocolAction::CancelOffer => {
            if ctx.facts.offers == 0 {
                return Err(CompileError::missing("offer cells", "no offer cell in transaction"));
            }
            format!("CANCEL {} OFFER(S)", ctx.facts.offers)
        }
        ProtocolAction::AcceptOffer => {
            let offer = ctx.decoder.offer_cell(ctx.tx, DataType::Old)?;
            format!(
                "ACCEPT THE OFFER ON {} WITH {} CKB",
                offer.account,
                capacity_to_str(offer.price)
            )
        }
        ProtocolAction::DeclareReverseRecord => format!(
            "DECLARE A REVERSE RECORD FROM {} TO {}",
            ctx.first_output_owner()?,
            ctx.facts.account()?
        ),
        ProtocolAction::RedeclareReverseRecord => format!(
            "REDECLARE A REVERSE RECORD FROM {} TO {}",
            ctx.first_output_owner()?,
            ctx.facts.account()?
        ),
        ProtocolAction::RetractReverseRecord => {
            format!("RETRACT REVERSE RECORDS ON {}", ctx.first_output_owner()?)
        }
        ProtocolAction::CreateApproval => {
            let approval = ctx.transfer_approval(DataType::New)?;
            format!(
                "APPROVE TRANSFER {} TO {} AFTER {}",
                ctx.facts.account()?,
                ctx.lock_owner_normal(&approval.to_lock)?,
                approval.sealed_until
            )
        }
        ProtocolAction::DelayApproval => {
            let approval = ctx.transfer_approval(DataType::New)?;
            format!(
                "DELAY THE TRANSFER APPROVAL OF {} TO {}",
                ctx.facts.account()?,
                approval.sealed_until
            )
        }
        ProtocolAction::RevokeApproval => {
            ctx.transfer_approval(DataType::Old)?;
            format!("REVOKE THE TRANSFER APPROVAL OF {}", ctx.facts.account()?)
        }
        ProtocolAction::FulfillApproval => {
            let approval = ctx.transfer_approval(DataType::Old)?;
            format!(
                "FULFILL THE TRANSFER APPROVAL OF {}, TRANSFER TO {}",
                ctx.facts.account()?,
                ctx.lock_owner_normal(&approval.to_lock)?
            )
        }
        ProtocolAction::LockAccountForCrossChain => {
            format!("LOCK {} FOR CROSS CHAIN", ctx.facts.account()?)
        }
        ProtocolAction::TransferDp => ctx.transfer_dp_message()?,
        ProtocolAction::BurnDp => ctx.burn_dp_message()?,
        ProtocolAction::BidExpiredAccountAuction => ctx.bid_message().await?,
    };
    Ok(message)
}

impl DispatchContext<'_> {
    // ── addresses ────────────────────────────────────────────────────

    /// Display form of the owner in das-lock args.
    fn owner_normal(&self, args: &[u8]) -> Result<String, CompileError> {
        let (owner, _) = self.format.args_to_normal(args)?;
        Ok(owner.address_normal)
    }

    fn first_output_owner(&self) -> Result<String, CompileError> {
        let output = self
            .tx
            .outputs
            .first()
            .ok_or_else(|| CompileError::missing("output 0", "transaction has no outputs"))?;
        self.owner_normal(&output.lock.args)
    }

    /// Display form of whoever a lock script belongs to.
    fn lock_owner_normal(&self, lock: &Script) -> Result<String, CompileError> {
        let (owner, _) = self.format.script_to_hex(lock)?;
        Ok(self.format.hex_to_normal(&owner)?.address_normal)
    }

    /// Grouping key for capacity transfers: das-lock owners by their
    /// display address, every other lock by its script address.
    fn recipient(&self, lock: &Script) -> Result<String, CompileError> {
        if self
            .format
            .registry()
            .is_contract(ContractName::DasLock, &lock.code_hash)
        {
            self.owner_normal(&lock.args)
        } else {
            Ok(self
                .script_formatter
                .script_to_address(self.format.net(), lock)?)
        }
    }

    fn transfer_approval(&self, side: DataType) -> Result<TransferApprovalParams, CompileError> {
        let account_cell = self.decoder.account_cell(self.tx, side)?;
        match account_cell.approval {
            Some(AccountApproval::Transfer(params)) => Ok(params),
            Some(AccountApproval::Unknown) => Err(CompileError::missing(
                "transfer approval",
                format!("{} account cell carries a non-transfer approval", side),
            )),
            None => Err(CompileError::missing(
                "transfer approval",
                format!("{} account cell carries no approval", side),
            )),
        }
    }

    // ── capacity transfers ───────────────────────────────────────────

    fn transfer_message(&self) -> Result<String, CompileError> {
        let mut from = GroupedAmounts::new();
        for cell in self.input_cells {
            from.add(self.recipient(cell.lock())?, cell.capacity())?;
        }
        let mut to = GroupedAmounts::new();
        for output in &self.tx.outputs {
            to.add(self.recipient(&output.lock)?, output.capacity)?;
        }
        if from.is_empty() || to.is_empty() {
            return Err(CompileError::missing(
                "transfer parties",
                "transfer needs at least one input and one output",
            ));
        }
        Ok(format!(
            "TRANSFER FROM {} TO {}",
            from.render("CKB", capacity_to_str),
            to.render("CKB", capacity_to_str)
        ))
    }

    // ── DP ───────────────────────────────────────────────────────────

    fn dp_inputs(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.input_cells
            .iter()
            .filter(|c| is_token_cell(self.format.registry(), c))
    }

    fn dp_outputs(&self) -> Vec<Cell> {
        self.tx
            .output_cells()
            .into_iter()
            .filter(|c| is_token_cell(self.format.registry(), c))
            .collect()
    }

    /// DP amounts grouped by owner display address.
    fn group_dp<'c>(
        &self,
        cells: impl IntoIterator<Item = &'c Cell>,
    ) -> Result<GroupedAmounts, CompileError> {
        let mut grouped = GroupedAmounts::new();
        for cell in cells {
            let owner = self.owner_normal(&cell.lock().args)?;
            grouped.add(owner, self.decoder.token_value(&cell.data)?)?;
        }
        Ok(grouped)
    }

    fn transfer_dp_message(&self) -> Result<String, CompileError> {
        let from = self.group_dp(self.dp_inputs())?;
        let outputs = self.dp_outputs();
        let to = self.group_dp(&outputs)?;
        if from.is_empty() || to.is_empty() {
            return Err(CompileError::missing(
                "dp cells",
                "dp transfer needs dp cells among inputs and outputs",
            ));
        }
        Ok(format!(
            "TRANSFER FROM {} TO {}",
            from.render("DP", dp_to_str),
            to.render("DP", dp_to_str)
        ))
    }

    fn burn_dp_message(&self) -> Result<String, CompileError> {
        let from = self.group_dp(self.dp_inputs())?;
        let (owner, spent) = single_owner(&from)?;
        let outputs = self.dp_outputs();
        let returned = self.group_dp(&outputs)?.get(owner).unwrap_or(0);
        let burnt = spent.checked_sub(returned).ok_or_else(|| {
            CompileError::InvalidAmount(format!(
                "{} returns {} DP units but spends only {}",
                owner, returned, spent
            ))
        })?;
        Ok(format!("BURN {} DP FROM {}", dp_to_str(burnt), owner))
    }

    async fn bid_message(&self) -> Result<String, CompileError> {
        let mut from = GroupedAmounts::new();
        for cell in self.dp_inputs() {
            let (owner, _): (ChainAddress, ChainAddress) =
                self.format.codec().decode(&cell.lock().args)?;
            from.add(owner.payload_key(), self.decoder.token_value(&cell.data)?)?;
        }
        let (payload, spent) = single_owner(&from)?;
        let outputs = self
            .token_map
            .outputs_token_map(self.tx)
            .await
            .map_err(CompileError::TokenMap)?;
        let returned = outputs.get(payload).copied().unwrap_or(0);
        let cost = spent.checked_sub(returned).ok_or_else(|| {
            CompileError::InvalidAmount(format!(
                "bidder gets back {} DP units but spends only {}",
                returned, spent
            ))
        })?;
        Ok(format!(
            "BID EXPIRED ACCOUNT {} WITH {} DP",
            self.facts.account()?,
            dp_to_str(cost)
        ))
    }
}

/// The one group of a grouping that must not have more than one.
fn single_owner(grouped: &GroupedAmounts) -> Result<(&str, u64), CompileError> {
    let mut groups = grouped.iter();
    let first = groups
        .next()
        .ok_or_else(|| CompileError::missing("dp inputs", "no dp cell among the inputs"))?;
    if let Some((other, _)) = groups.next() {
        return Err(CompileError::ambiguous(format!(
            "dp inputs belong to more than one owner: {} and {}",
            first.0, other
        )));
    }
    Ok(first)
}
