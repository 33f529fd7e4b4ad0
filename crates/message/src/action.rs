use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CompileError;

/// The protocol actions a transaction can declare in its action witness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolAction {
    Transfer,
    WithdrawFromWallet,
    TransferAccount,
    EditManager,
    EditRecords,
    StartAccountSale,
    EditAccountSale,
    CancelAccountSale,
    BuyAccount,
    MakeOffer,
    EditOffer,
    CancelOffer,
    AcceptOffer,
    DeclareReverseRecord,
    RedeclareReverseRecord,
    RetractReverseRecord,
    CreateApproval,
    DelayApproval,
    RevokeApproval,
    FulfillApproval,
    LockAccountForCrossChain,
    TransferDp,
    BurnDp,
    BidExpiredAccountAuction,
}

impl ProtocolAction {
    pub const ALL: [ProtocolAction; 24] = [
        ProtocolAction::Transfer,
        ProtocolAction::WithdrawFromWallet,
        ProtocolAction::TransferAccount,
        ProtocolAction::EditManager,
        ProtocolAction::EditRecords,
        ProtocolAction::StartAccountSale,
        ProtocolAction::EditAccountSale,
        ProtocolAction::CancelAccountSale,
        ProtocolAction::BuyAccount,
        ProtocolAction::MakeOffer,
        ProtocolAction::EditOffer,
        ProtocolAction::CancelOffer,
        ProtocolAction::AcceptOffer,
        ProtocolAction::DeclareReverseRecord,
        ProtocolAction::RedeclareReverseRecord,
        ProtocolAction::RetractReverseRecord,
        ProtocolAction::CreateApproval,
        ProtocolAction::DelayApproval,
        ProtocolAction::RevokeApproval,
        ProtocolAction::FulfillApproval,
        ProtocolAction::LockAccountForCrossChain,
        ProtocolAction::TransferDp,
        ProtocolAction::BurnDp,
        ProtocolAction::BidExpiredAccountAuction,
    ];

    /// Wire name as carried in the action witness.
    pub fn as_str(self) -> &'static str {
        match self {
            ProtocolAction::Transfer => "transfer",
            ProtocolAction::WithdrawFromWallet => "withdraw_from_wallet",
            ProtocolAction::TransferAccount => "transfer_account",
            ProtocolAction::EditManager => "edit_manager",
            ProtocolAction::EditRecords => "edit_records",
            ProtocolAction::StartAccountSale => "start_account_sale",
            ProtocolAction::EditAccountSale => "edit_account_sale",
            ProtocolAction::CancelAccountSale => "cancel_account_sale",
            ProtocolAction::BuyAccount => "buy_account",
            ProtocolAction::MakeOffer => "make_offer",
            ProtocolAction::EditOffer => "edit_offer",
            ProtocolAction::CancelOffer => "cancel_offer",
            ProtocolAction::AcceptOffer => "accept_offer",
            ProtocolAction::DeclareReverseRecord => "declare_reverse_record",
            ProtocolAction::RedeclareReverseRecord => "redeclare_reverse_record",
            ProtocolAction::RetractReverseRecord => "retract_reverse_record",
            ProtocolAction::CreateApproval => "create_approval",
            ProtocolAction::DelayApproval => "delay_approval",
            ProtocolAction::RevokeApproval => "revoke_approval",
            ProtocolAction::FulfillApproval => "fulfill_approval",
            ProtocolAction::LockAccountForCrossChain => "lock_account_for_cross_chain",
            ProtocolAction::TransferDp => "transfer_dp",
            ProtocolAction::BurnDp => "burn_dp",
            ProtocolAction::BidExpiredAccountAuction => "bid_expired_account_auction",
        }
    }
}

impl fmt::Display for ProtocolAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolAction {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProtocolAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| CompileError::UnsupportedAction(s.to_string()))
    }
}
